//! Cartesian expansion of placeholder candidate values.

/// Build every combination of one value per placeholder, joined by `separator`.
///
/// `value_lists` is ordered; the first placeholder varies fastest, so
/// `[["a", "b"], ["1", "2"]]` gives `a~1, b~1, a~2, b~2`. The result holds
/// `∏ |list|` entries.
///
/// A placeholder with no candidate values does not empty the product. It
/// contributes nothing and drops out, so `[["a", "b"], []]` expands to
/// `["a", "b"]`. Callers that need one value per placeholder must reject
/// empty lists before expanding.
///
/// # Examples
/// ```
/// use routeprobe::discovery::expand;
///
/// let lists = vec![
///     ("node", vec!["1".to_string(), "2".to_string()]),
///     ("display", vec!["full".to_string()]),
/// ];
/// assert_eq!(expand("~", &lists), vec!["1~full", "2~full"]);
/// ```
pub fn expand<K, V>(separator: &str, value_lists: &[(K, Vec<V>)]) -> Vec<String>
where
    V: AsRef<str>,
{
    let mut results = Vec::new();
    accumulate(separator, &mut results, value_lists);
    results
}

fn accumulate<K, V>(separator: &str, results: &mut Vec<String>, remaining: &[(K, Vec<V>)])
where
    V: AsRef<str>,
{
    let Some(((_, values), rest)) = remaining.split_first() else {
        return;
    };

    if results.is_empty() {
        results.extend(values.iter().map(|value| value.as_ref().to_string()));
    } else if !values.is_empty() {
        let mut next = Vec::with_capacity(results.len() * values.len());
        for value in values {
            for partial in results.iter() {
                next.push(format!("{partial}{separator}{}", value.as_ref()));
            }
        }
        *results = next;
    }

    accumulate(separator, results, rest);
}

/// Number of combinations `expand` will produce for `value_lists`.
pub fn combination_count<K, V>(value_lists: &[(K, Vec<V>)]) -> usize {
    let mut non_empty = value_lists.iter().filter(|(_, values)| !values.is_empty()).peekable();
    if non_empty.peek().is_none() {
        return 0;
    }
    non_empty.map(|(_, values)| values.len()).product()
}
