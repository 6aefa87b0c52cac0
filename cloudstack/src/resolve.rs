//! Result selection for the generated name/id courtesy helpers.
//!
//! The generated helpers call a list operation and hand the reported count
//! and the element list here. Every outcome carries the count the platform
//! reported, which callers use to tell "nothing" from "too many".

use crate::error::CloudStackError;

/// Picks the id of the entry called `needle`.
///
/// - count 0: [`CloudStackError::NoMatch`]
/// - count 1: the only entry, whatever its name
/// - more: the entry whose name equals `needle` exactly, else
///   [`CloudStackError::AmbiguousMatch`]
///
/// ## Examples
///
/// ```
/// use cloudstack_runtime::resolve::pick_id_by_name;
///
/// let zones = vec![("z1", "Zone1"), ("z2", "Zone10")];
/// let (id, count) = pick_id_by_name("Zone1", 2, &zones, |z| z.0, |z| z.1).unwrap();
/// assert_eq!((id.as_str(), count), ("z1", 2));
/// ```
pub fn pick_id_by_name<T, I, N>(
    needle: &str,
    count: i32,
    items: &[T],
    id: I,
    name: N,
) -> Result<(String, i32), CloudStackError>
where
    I: Fn(&T) -> &str,
    N: Fn(&T) -> &str,
{
    let no_match = || CloudStackError::NoMatch {
        needle: needle.to_string(),
        count,
    };

    match count {
        c if c <= 0 => Err(no_match()),
        1 => items
            .first()
            .map(|item| (id(item).to_string(), count))
            .ok_or_else(no_match),
        _ => items
            .iter()
            .find(|item| name(item) == needle)
            .map(|item| (id(item).to_string(), count))
            .ok_or_else(|| CloudStackError::AmbiguousMatch {
                needle: needle.to_string(),
                count,
            }),
    }
}

/// Picks the single entry of a lookup by id.
///
/// ## Errors
///
/// [`CloudStackError::NoMatch`] for count 0 and
/// [`CloudStackError::MultipleResults`] for a count above 1.
pub fn pick_single<T>(kind: &str, id: &str, count: i32, items: Vec<T>) -> Result<(T, i32), CloudStackError> {
    match count {
        c if c <= 0 => Err(CloudStackError::NoMatch {
            needle: id.to_string(),
            count: 0,
        }),
        1 => items
            .into_iter()
            .next()
            .map(|item| (item, 1))
            .ok_or_else(|| CloudStackError::NoMatch {
                needle: id.to_string(),
                count,
            }),
        _ => Err(CloudStackError::MultipleResults {
            kind: kind.to_string(),
            id: id.to_string(),
            count,
        }),
    }
}

/// Returns `true` if `err` is the platform's answer to an id it cannot find.
pub fn is_invalid_id_error(err: &CloudStackError, id: &str) -> bool {
    err.to_string().contains(&format!(
        "Invalid parameter id value={id} due to incorrect long value format, or entity does not exist"
    ))
}

/// Finishes a lookup by id from the outcome of the list call.
///
/// `listed` is the list call's `(count, elements)`. An invalid-id API error
/// becomes a no-match with count 0; other errors pass through.
pub fn resolve_by_id<T>(
    kind: &str,
    id: &str,
    listed: Result<(i32, Vec<T>), CloudStackError>,
) -> Result<(T, i32), CloudStackError> {
    match listed {
        Ok((count, items)) => pick_single(kind, id, count, items),
        Err(err) if is_invalid_id_error(&err, id) => Err(CloudStackError::NoMatch {
            needle: id.to_string(),
            count: 0,
        }),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Zone {
        id: String,
        name: String,
    }

    fn zone(id: &str, name: &str) -> Zone {
        Zone {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn by_name(needle: &str, count: i32, zones: &[Zone]) -> Result<(String, i32), CloudStackError> {
        pick_id_by_name(needle, count, zones, |z| z.id.as_str(), |z| z.name.as_str())
    }

    #[test]
    fn single_result_is_taken_as_is() {
        let zones = [zone("z1", "Zone1")];
        assert_eq!(by_name("zone1", 1, &zones).unwrap(), ("z1".to_string(), 1));
    }

    #[test]
    fn zero_results_is_no_match_with_count() {
        let err = by_name("Nowhere", 0, &[]).unwrap_err();
        assert!(matches!(&err, CloudStackError::NoMatch { needle, count: 0 } if needle == "Nowhere"));
    }

    #[test]
    fn several_results_need_an_exact_name() {
        let zones = [zone("z1", "Zone1"), zone("z2", "Zone2")];
        assert_eq!(by_name("Zone2", 2, &zones).unwrap(), ("z2".to_string(), 2));

        let err = by_name("Zone", 2, &zones).unwrap_err();
        assert!(matches!(err, CloudStackError::AmbiguousMatch { count: 2, .. }));
    }

    #[test]
    fn pick_single_outcomes() {
        let (z, count) = pick_single("Zone", "z1", 1, vec![zone("z1", "Zone1")]).unwrap();
        assert_eq!((z.id.as_str(), count), ("z1", 1));

        let err = pick_single::<Zone>("Zone", "z9", 0, vec![]).unwrap_err();
        assert_eq!(err.match_count(), Some(0));

        let err = pick_single("Zone", "z1", 2, vec![zone("z1", "a"), zone("z1", "b")]).unwrap_err();
        assert_eq!(err.to_string(), "There is more than one result for Zone UUID: z1!");
    }

    #[test]
    fn invalid_id_error_becomes_no_match() {
        let api = CloudStackError::Api {
            errorcode: 431,
            cserrorcode: 4350,
            errortext: "Invalid parameter id value=abc due to incorrect long value format, or entity does not exist"
                .to_string(),
        };
        let err = resolve_by_id::<Zone>("Zone", "abc", Err(api)).unwrap_err();
        assert!(matches!(err, CloudStackError::NoMatch { count: 0, .. }));

        let other = CloudStackError::JobFailed("boom".into());
        let err = resolve_by_id::<Zone>("Zone", "abc", Err(other)).unwrap_err();
        assert!(matches!(err, CloudStackError::JobFailed(_)));
    }
}
