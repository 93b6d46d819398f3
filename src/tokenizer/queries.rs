//! Token filter builders
//!
//! Every builder takes an explicit [`SoftDelete`] choice.

use crate::filter::{DataQuery, DataQueryGroup};

pub const UUID_FIELD: &str = "uuid";
pub const DOMAIN_FIELD: &str = "domainUuid";
pub const DELETED_FIELD: &str = "isDeleted";

/// Whether soft-deleted tokens are visible to a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftDelete {
    /// Only tokens whose delete flag is false
    Exclude,
    /// Deleted and live tokens alike
    Include,
}

fn scope(domain: &str, soft_delete: SoftDelete) -> DataQueryGroup {
    let mut group = DataQueryGroup::single(DataQuery::exact(DOMAIN_FIELD, domain));
    if soft_delete == SoftDelete::Exclude {
        group.push(DataQuery::boolean(DELETED_FIELD, false));
    }
    group
}

/// Every token of a domain
pub fn by_domain(domain: &str, soft_delete: SoftDelete) -> Vec<DataQueryGroup> {
    vec![scope(domain, soft_delete)]
}

/// One token of a domain
pub fn by_domain_and_id(domain: &str, id: &str, soft_delete: SoftDelete) -> Vec<DataQueryGroup> {
    let mut group = scope(domain, soft_delete);
    group.push(DataQuery::exact(UUID_FIELD, id));
    vec![group]
}

/// Tokens of a domain whose id is any of `ids`
///
/// Two groups, combined by the caller with `and`: the domain scope, and
/// an `or` over the ids.
pub fn by_domain_and_ids(domain: &str, ids: &[String], soft_delete: SoftDelete) -> Vec<DataQueryGroup> {
    let id_group = DataQueryGroup::any(
        ids.iter()
            .map(|id| DataQuery::exact(UUID_FIELD, id.as_str()))
            .collect(),
    );
    vec![scope(domain, soft_delete), id_group]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{compile, LogicalOperator};
    use serde_json::json;

    #[test]
    fn test_by_domain_and_id_excluding_deleted() {
        let groups = by_domain_and_id("acme", "t1", SoftDelete::Exclude);
        let filter = compile(&groups, LogicalOperator::And).unwrap();
        assert_eq!(
            filter.into_value(),
            json!({"$and": [
                {"domainUuid": "acme"},
                {"isDeleted": false},
                {"uuid": "t1"}
            ]})
        );
    }

    #[test]
    fn test_include_drops_delete_flag() {
        let groups = by_domain_and_id("acme", "t1", SoftDelete::Include);
        let filter = compile(&groups, LogicalOperator::And).unwrap();
        assert_eq!(
            filter.into_value(),
            json!({"$and": [{"domainUuid": "acme"}, {"uuid": "t1"}]})
        );
    }

    #[test]
    fn test_by_domain_single_predicate_is_unwrapped() {
        let filter = compile(&by_domain("acme", SoftDelete::Include), LogicalOperator::And).unwrap();
        assert_eq!(filter.into_value(), json!({"domainUuid": "acme"}));
    }

    #[test]
    fn test_by_domain_and_ids() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let groups = by_domain_and_ids("acme", &ids, SoftDelete::Exclude);
        let filter = compile(&groups, LogicalOperator::And).unwrap();
        assert_eq!(
            filter.into_value(),
            json!({"$and": [
                {"$and": [{"domainUuid": "acme"}, {"isDeleted": false}]},
                {"$or": [{"uuid": "a"}, {"uuid": "b"}]}
            ]})
        );
    }
}
