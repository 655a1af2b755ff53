//! Entity resolution: free-text names from the model matched against store
//! rows.
//!
//! The model is not guaranteed to reproduce canonical names exactly
//! ("Gómez" for "Arq. Gómez"), so matching is case-insensitive
//! substring-contains over the display string. First match wins; there is no
//! scoring and no disambiguation of multiple candidates. That tolerates
//! phrasing drift at the cost of false positives on short names, an accepted
//! limitation.

use crate::model::{Client, Locality};

/// Find the first client whose `"first_name last_name"` contains the query,
/// ignoring case.
pub fn match_client<'a>(clients: &'a [Client], query: &str) -> Option<&'a Client> {
    let needle = query.to_lowercase();
    clients
        .iter()
        .find(|c| c.display_name().to_lowercase().contains(&needle))
}

/// Find the first locality whose name contains the query, ignoring case.
/// The caller derives the region id from the matched row, so locality and
/// region resolve together or not at all.
pub fn match_locality<'a>(localities: &'a [Locality], query: &str) -> Option<&'a Locality> {
    let needle = query.to_lowercase();
    localities
        .iter()
        .find(|l| l.name.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: i64, first: &str, last: &str) -> Client {
        Client {
            id,
            first_name: first.into(),
            last_name: last.into(),
        }
    }

    fn locality(id: i64, name: &str, region_id: i64) -> Locality {
        Locality {
            id,
            name: name.into(),
            region_id,
        }
    }

    #[test]
    fn matches_client_by_last_name_substring() {
        let clients = vec![
            client(3, "María", "Fernández"),
            client(7, "Arq.", "Gómez"),
        ];
        let found = match_client(&clients, "Gómez").unwrap();
        assert_eq!(found.id, 7);
    }

    #[test]
    fn client_match_is_case_insensitive() {
        let clients = vec![client(7, "Arq.", "Gómez")];
        assert_eq!(match_client(&clients, "gómez").unwrap().id, 7);
        assert_eq!(match_client(&clients, "ARQ. GÓMEZ").unwrap().id, 7);
    }

    #[test]
    fn client_match_spans_first_and_last_name() {
        let clients = vec![client(9, "Juan", "Pérez")];
        // The space between first and last name is part of the haystack.
        assert_eq!(match_client(&clients, "juan pérez").unwrap().id, 9);
    }

    #[test]
    fn first_client_match_wins() {
        let clients = vec![
            client(1, "Ana", "García"),
            client(2, "Pedro", "García"),
        ];
        assert_eq!(match_client(&clients, "garcía").unwrap().id, 1);
    }

    #[test]
    fn no_client_match_yields_none() {
        let clients = vec![client(7, "Arq.", "Gómez")];
        assert!(match_client(&clients, "Rodríguez").is_none());
        assert!(match_client(&[], "Gómez").is_none());
    }

    #[test]
    fn matches_locality_and_exposes_region() {
        let localities = vec![
            locality(10, "Rosario", 2),
            locality(11, "Córdoba", 5),
        ];
        let found = match_locality(&localities, "córdoba").unwrap();
        assert_eq!(found.id, 11);
        assert_eq!(found.region_id, 5);
    }

    #[test]
    fn locality_match_tolerates_partial_text() {
        let localities = vec![locality(12, "Villa Carlos Paz", 5)];
        assert_eq!(match_locality(&localities, "carlos paz").unwrap().id, 12);
    }

    #[test]
    fn no_locality_match_yields_none() {
        let localities = vec![locality(10, "Rosario", 2)];
        assert!(match_locality(&localities, "Mendoza").is_none());
    }
}
