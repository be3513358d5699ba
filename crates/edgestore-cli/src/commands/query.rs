use anyhow::Result;
use edgestore_core::{Filter, GraphService, Page, RelatedUrnsQuery, RelationshipFilter};

use super::parse_urn;
use crate::cli::RelatedArgs;

/// Build the traversal query described by the command-line arguments
pub fn build_query(args: RelatedArgs) -> Result<RelatedUrnsQuery> {
    let page = Page::from_signed(args.offset, args.count)?;

    let mut query = RelatedUrnsQuery::new(args.relationship_types)
        .relationship_filter(RelationshipFilter::new(args.direction.into()));
    query.page = page;

    if let Some(t) = args.source_type {
        query = query.source_type(t);
    }
    if let Some(urn) = args.source_urn {
        query = query.source_filter(Filter::urn(&parse_urn(&urn)?));
    }
    if let Some(t) = args.destination_type {
        query = query.destination_type(t);
    }
    if let Some(urn) = args.destination_urn {
        query = query.destination_filter(Filter::urn(&parse_urn(&urn)?));
    }
    Ok(query)
}

pub async fn related(service: &dyn GraphService, args: RelatedArgs) -> Result<Vec<String>> {
    let query = build_query(args)?;
    Ok(service.find_related_urns(&query).await?)
}

pub async fn types(service: &dyn GraphService) -> Result<Vec<String>> {
    Ok(service.relationship_types().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DirectionArg;
    use edgestore_core::{Direction, GraphError};

    fn args() -> RelatedArgs {
        RelatedArgs {
            relationship_types: vec!["HasOwner".to_string()],
            source_type: Some("dataset".to_string()),
            source_urn: None,
            destination_type: None,
            destination_urn: Some("urn:li:corpuser:u".to_string()),
            direction: DirectionArg::Incoming,
            offset: 2,
            count: 3,
        }
    }

    #[test]
    fn test_build_query() {
        let query = build_query(args()).unwrap();
        assert_eq!(query.source_type.as_deref(), Some("dataset"));
        assert_eq!(query.relationship_filter.direction, Direction::Incoming);
        assert_eq!(query.page, Page::new(2, 3));
        assert!(!query.destination_filter.is_empty());
    }

    #[test]
    fn test_negative_count_is_invalid_argument() {
        let err = build_query(RelatedArgs { count: -1, ..args() }).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraphError>(),
            Some(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_bad_urn_is_rejected() {
        let err = build_query(RelatedArgs {
            source_urn: Some("dataset".to_string()),
            ..args()
        });
        assert!(err.is_err());
    }
}
