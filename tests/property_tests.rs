//! Property-based tests for routeprobe using proptest
//!
//! These tests generate random placeholder value lists and route tables to
//! check the cartesian expansion and the route listing end to end.

use assert_cmd::prelude::*;
use proptest::prelude::*;
use routeprobe::discovery::{combination_count, expand};
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

const NAME: &str = "routeprobe";
const SEPARATOR: &str = "~~~";

/// Placeholder values that never contain the separator
fn value_strategy() -> impl Strategy<Value = String> {
    r"[a-z0-9]{1,6}"
}

/// Between one and four placeholders, each with one to four candidate values
fn value_lists_strategy() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec(
        (r"[a-z]{1,8}", prop::collection::vec(value_strategy(), 1..5)),
        1..5,
    )
}

/// Reference product: first list varies fastest
fn nested_product(lists: &[(String, Vec<String>)]) -> Vec<Vec<String>> {
    let mut combinations: Vec<Vec<String>> = vec![Vec::new()];
    for (_, values) in lists {
        let mut next = Vec::new();
        for value in values {
            for partial in &combinations {
                let mut combination = partial.clone();
                combination.push(value.clone());
                next.push(combination);
            }
        }
        combinations = next;
    }
    combinations
}

proptest! {
    #[test]
    fn test_expand_yields_full_product(lists in value_lists_strategy()) {
        let expected: usize = lists.iter().map(|(_, values)| values.len()).product();
        let results = expand(SEPARATOR, &lists);

        prop_assert_eq!(results.len(), expected);
        prop_assert_eq!(combination_count(&lists), expected);
    }

    #[test]
    fn test_expand_takes_one_value_per_placeholder_in_order(lists in value_lists_strategy()) {
        let results = expand(SEPARATOR, &lists);
        let expected: Vec<String> = nested_product(&lists)
            .into_iter()
            .map(|combination| combination.join(SEPARATOR))
            .collect();

        for result in &results {
            let parts: Vec<&str> = result.split(SEPARATOR).collect();
            prop_assert_eq!(parts.len(), lists.len());
            for (part, (_, values)) in parts.iter().zip(&lists) {
                prop_assert!(values.iter().any(|value| value == part));
            }
        }
        prop_assert_eq!(results, expected);
    }

    #[test]
    fn test_expand_drops_empty_lists(
        lists in value_lists_strategy(),
        empty_at in prop::collection::vec(0usize..5, 0..3),
    ) {
        let mut with_empties = lists.clone();
        for position in empty_at {
            let position = position.min(with_empties.len());
            with_empties.insert(position, ("empty".to_string(), Vec::new()));
        }

        prop_assert_eq!(expand(SEPARATOR, &with_empties), expand(SEPARATOR, &lists));
        prop_assert_eq!(combination_count(&with_empties), combination_count(&lists));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_route_list_prints_one_url_per_value(
        values in prop::collection::vec(value_strategy(), 1..6),
    ) {
        let quoted: Vec<String> = values.iter().map(|value| format!("\"{value}\"")).collect();
        let mut routes = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            routes,
            "[[routes]]\nname = \"item.view\"\npath = \"/item/{{id}}\"\n\n[parameters]\nid = [{}]\n",
            quoted.join(", ")
        )
        .unwrap();

        let output = Command::cargo_bin(NAME)
            .unwrap()
            .arg("--no-config")
            .arg("--routes")
            .arg(routes.path())
            .args(["route", "list"])
            .output()
            .unwrap();

        prop_assert!(output.status.success());
        let expected: String = values.iter().map(|value| format!("/item/{value}\n")).collect();
        prop_assert_eq!(String::from_utf8_lossy(&output.stdout).into_owned(), expected);
    }

    #[test]
    fn test_handles_random_route_table_content(content in r"[ -~\n]{0,200}") {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let output = Command::cargo_bin(NAME)
            .unwrap()
            .arg("--no-config")
            .arg("--routes")
            .arg(file.path())
            .args(["route", "list"])
            .output()
            .unwrap();

        // Any outcome is fine as long as the process exits normally
        prop_assert!(output.status.code().is_some());
    }
}
