//! Branch access policy - maps a principal's groups to visible cities.
//!
//! Two tables are evaluated with different rules:
//! - the list table unions the cities of every matching group;
//! - the detail table takes the first matching group in declared order.
//!
//! In both, a principal with no recognized group is unrestricted.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Visibility predicate over the customer city attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityFilter {
    /// No city restriction; every active record is visible
    Unrestricted,
    /// Only records whose city is in the set (exact, case-sensitive)
    Cities(BTreeSet<String>),
}

impl CityFilter {
    /// Build a restricted filter from city names.
    pub fn cities<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CityFilter::Cities(cities.into_iter().map(Into::into).collect())
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, CityFilter::Unrestricted)
    }

    /// Check whether a record in `city` passes the filter.
    pub fn allows(&self, city: &str) -> bool {
        match self {
            CityFilter::Unrestricted => true,
            CityFilter::Cities(cities) => cities.contains(city),
        }
    }
}

/// One row of a group table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCities {
    pub group: String,
    /// `None` grants every city
    pub cities: Option<BTreeSet<String>>,
}

impl GroupCities {
    /// Row granting every city.
    pub fn all(group: &str) -> Self {
        Self {
            group: group.to_string(),
            cities: None,
        }
    }

    /// Row granting the listed cities.
    pub fn only(group: &str, cities: &[&str]) -> Self {
        Self {
            group: group.to_string(),
            cities: Some(cities.iter().map(|c| c.to_string()).collect()),
        }
    }
}

/// Ordered group -> cities table. Declaration order is evaluation priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCityTable {
    entries: Vec<GroupCities>,
}

impl GroupCityTable {
    /// Create a table, rejecting duplicate group names.
    pub fn new(entries: Vec<GroupCities>) -> AppResult<Self> {
        let mut seen = BTreeSet::new();
        for entry in &entries {
            if !seen.insert(entry.group.as_str()) {
                return Err(AppError::internal(format!(
                    "group '{}' appears twice in access table",
                    entry.group
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Table rows the principal belongs to, in table order.
    fn matching<'a>(&'a self, groups: &'a [String]) -> impl Iterator<Item = &'a GroupCities> {
        self.entries
            .iter()
            .filter(move |entry| groups.iter().any(|g| *g == entry.group))
    }

    /// Union of the cities of every matching group.
    ///
    /// Any matching unrestricted group short-circuits to `Unrestricted`;
    /// no matching group at all is also `Unrestricted`.
    pub fn union_filter(&self, groups: &[String]) -> CityFilter {
        let mut cities = BTreeSet::new();
        let mut matched = false;

        for entry in self.matching(groups) {
            matched = true;
            match &entry.cities {
                None => return CityFilter::Unrestricted,
                Some(set) => cities.extend(set.iter().cloned()),
            }
        }

        if matched {
            CityFilter::Cities(cities)
        } else {
            CityFilter::Unrestricted
        }
    }

    /// Cities of the first matching group in table order.
    ///
    /// An unrestricted or empty first match, or no match, is `Unrestricted`.
    pub fn first_match_filter(&self, groups: &[String]) -> CityFilter {
        match self.matching(groups).next() {
            Some(GroupCities {
                cities: Some(set), ..
            }) if !set.is_empty() => CityFilter::Cities(set.clone()),
            _ => CityFilter::Unrestricted,
        }
    }
}

/// On-disk layout of a policy override file.
#[derive(Debug, Deserialize)]
struct PolicyFile {
    list: Vec<GroupCities>,
    detail: Vec<GroupCities>,
}

/// Immutable access policy built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    list: GroupCityTable,
    detail: GroupCityTable,
}

impl AccessPolicy {
    pub fn new(list: GroupCityTable, detail: GroupCityTable) -> Self {
        Self { list, detail }
    }

    /// Filter for the list/create endpoint (union rule).
    pub fn list_filter(&self, groups: &[String]) -> CityFilter {
        self.list.union_filter(groups)
    }

    /// Filter for the per-id GET endpoint (first-match rule).
    pub fn detail_filter(&self, groups: &[String]) -> CityFilter {
        self.detail.first_match_filter(groups)
    }

    /// Parse a policy from its JSON representation.
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let file: PolicyFile = serde_json::from_str(raw)
            .map_err(|e| AppError::internal(format!("Invalid access policy: {}", e)))?;
        Ok(Self::new(
            GroupCityTable::new(file.list)?,
            GroupCityTable::new(file.detail)?,
        ))
    }

    /// Load a policy from a JSON file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::internal(format!(
                "Failed to read access policy {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Built-in policy, or the file override when a path is given.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading access policy from file");
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        let list = vec![
            GroupCities::all("Admin"),
            GroupCities::all("HeadOffice"),
            GroupCities::only("ColomboBranch", &["Colombo"]),
            GroupCities::only("KandyBranch", &["Kandy"]),
            GroupCities::only("GalleBranch", &["Galle"]),
            GroupCities::only("WattalaBranch", &["Wattala"]),
            GroupCities::only("JaffnaBranch", &["Jaffna"]),
            GroupCities::only("NegomboBranch", &["Negombo"]),
        ];
        let detail = vec![
            GroupCities::all("Admin"),
            GroupCities::all("HeadOffice"),
            GroupCities::only("ColomboTeam", &["Colombo"]),
            GroupCities::only("KandyTeam", &["Kandy"]),
            GroupCities::only("WattalaTeam", &["Wattala"]),
            GroupCities::only("GalleTeam", &["Galle"]),
            GroupCities::only("NegomboTeam", &["Negombo"]),
            GroupCities::only("JaffnaTeam", &["Jaffna"]),
        ];

        // Built-in tables have unique group names.
        Self {
            list: GroupCityTable { entries: list },
            detail: GroupCityTable { entries: detail },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_no_recognized_group_is_unrestricted() {
        let policy = AccessPolicy::default();
        assert_eq!(policy.list_filter(&[]), CityFilter::Unrestricted);
        assert_eq!(policy.detail_filter(&[]), CityFilter::Unrestricted);

        let unknown = groups(&["Marketing"]);
        assert_eq!(policy.list_filter(&unknown), CityFilter::Unrestricted);
        assert_eq!(policy.detail_filter(&unknown), CityFilter::Unrestricted);
    }

    #[test]
    fn test_single_branch_restricts_to_its_city() {
        let policy = AccessPolicy::default();
        let filter = policy.list_filter(&groups(&["ColomboBranch"]));

        assert_eq!(filter, CityFilter::cities(["Colombo"]));
        assert!(filter.allows("Colombo"));
        assert!(!filter.allows("Kandy"));
        assert!(!filter.allows("colombo"));
    }

    #[test]
    fn test_union_of_several_branches() {
        let policy = AccessPolicy::default();
        let filter = policy.list_filter(&groups(&["GalleBranch", "KandyBranch"]));
        assert_eq!(filter, CityFilter::cities(["Galle", "Kandy"]));
    }

    #[test]
    fn test_unrestricted_group_short_circuits_union() {
        let policy = AccessPolicy::default();
        let filter = policy.list_filter(&groups(&["KandyBranch", "HeadOffice"]));
        assert!(filter.is_unrestricted());
    }

    #[test]
    fn test_list_rule_ignores_team_groups() {
        let policy = AccessPolicy::default();
        assert!(policy.list_filter(&groups(&["ColomboTeam"])).is_unrestricted());
        assert!(policy.detail_filter(&groups(&["ColomboBranch"])).is_unrestricted());
    }

    #[test]
    fn test_first_match_uses_table_order() {
        let policy = AccessPolicy::default();
        // KandyTeam precedes GalleTeam in the table, whatever the principal's order.
        let filter = policy.detail_filter(&groups(&["GalleTeam", "KandyTeam"]));
        assert_eq!(filter, CityFilter::cities(["Kandy"]));
    }

    #[test]
    fn test_first_match_admin_wins_over_team() {
        let policy = AccessPolicy::default();
        let filter = policy.detail_filter(&groups(&["JaffnaTeam", "Admin"]));
        assert!(filter.is_unrestricted());
    }

    #[test]
    fn test_first_match_with_empty_cities_is_unrestricted() {
        let table = GroupCityTable::new(vec![GroupCities::only("Ghost", &[])]).unwrap();
        assert!(table.first_match_filter(&groups(&["Ghost"])).is_unrestricted());
        // The union rule keeps the empty restriction: nothing is visible.
        assert_eq!(
            table.union_filter(&groups(&["Ghost"])),
            CityFilter::Cities(BTreeSet::new())
        );
    }

    #[test]
    fn test_duplicate_groups_rejected() {
        let result = GroupCityTable::new(vec![
            GroupCities::all("Admin"),
            GroupCities::only("Admin", &["Colombo"]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_policy_from_json() {
        let raw = r#"{
            "list": [
                {"group": "Admin", "cities": null},
                {"group": "SouthBranch", "cities": ["Galle", "Matara"]}
            ],
            "detail": [
                {"group": "SouthTeam", "cities": ["Galle"]}
            ]
        }"#;

        let policy = AccessPolicy::from_json(raw).unwrap();
        assert_eq!(
            policy.list_filter(&groups(&["SouthBranch"])),
            CityFilter::cities(["Galle", "Matara"])
        );
        assert_eq!(
            policy.detail_filter(&groups(&["SouthTeam"])),
            CityFilter::cities(["Galle"])
        );
        assert!(policy.list_filter(&groups(&["ColomboBranch"])).is_unrestricted());
    }

    #[test]
    fn test_policy_from_malformed_json() {
        assert!(AccessPolicy::from_json("{\"list\": []}").is_err());
        assert!(AccessPolicy::from_json("not json").is_err());
    }
}
