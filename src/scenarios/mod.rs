//! Built-in scenario groups for the MyAnimeList v2 API
//!
//! Groups are independent of each other; a failure in one never stops
//! the next from running. Order within each group is load-bearing.

pub mod anime;
pub mod manga;
pub mod user;

use crate::common::{Error, Result};
use crate::runner::ScenarioGroup;

/// All built-in groups, in run order
pub fn all() -> Vec<ScenarioGroup> {
    vec![
        anime::list_management(),
        anime::discovery(),
        manga::list_management(),
        user::profile(),
    ]
}

/// Select built-in groups by name, preserving run order
pub fn select(names: &[String]) -> Result<Vec<ScenarioGroup>> {
    let groups = all();
    for name in names {
        if !groups.iter().any(|g| &g.name == name) {
            let known: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
            return Err(Error::Config(format!(
                "unknown group '{}'. Known groups: {}",
                name,
                known.join(", ")
            )));
        }
    }
    Ok(groups
        .into_iter()
        .filter(|g| names.contains(&g.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_have_unique_names_and_cases() {
        let groups = all();
        let mut names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), groups.len());
        assert!(groups.iter().all(|g| !g.cases.is_empty()));
    }

    #[test]
    fn dependent_cases_declare_their_preconditions() {
        for group in all() {
            for case in &group.cases {
                if case.request.path.contains("{animeId}") {
                    assert!(
                        case.requires.iter().any(|k| k == "animeId"),
                        "case '{}' uses animeId without requiring it",
                        case.name
                    );
                }
                if case.request.path.contains("{mangaId}") {
                    assert!(
                        case.requires.iter().any(|k| k == "mangaId"),
                        "case '{}' uses mangaId without requiring it",
                        case.name
                    );
                }
            }
        }
    }

    #[test]
    fn select_rejects_unknown_group() {
        assert!(select(&["nope".to_string()]).is_err());
        let picked = select(&["user-profile".to_string()]).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "user-profile");
    }
}
