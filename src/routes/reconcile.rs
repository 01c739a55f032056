// Decides how a desired route is applied to the router's existing table

use super::{IpAddress, Route};

/// How the active flag of the desired route is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveMode {
    /// Set the flag to this value
    Explicit(bool),
    /// Invert the flag of the route already in the table
    Toggle,
}

impl Default for ActiveMode {
    fn default() -> Self {
        ActiveMode::Explicit(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRoute {
    pub network: IpAddress,
    pub subnet_mask: IpAddress,
    pub gateway: IpAddress,
    pub mode: ActiveMode,
}

/// The route to submit, with its final active flag already set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub route: Route,
    /// True when the route is appended to the table instead of updating an entry
    pub created: bool,
}

/// Match `desired` against `existing` and resolve the route to submit.
///
/// The first structurally equal entry wins. Without a match the route is
/// appended, taking the slot right after the last table row.
pub fn reconcile(desired: &DesiredRoute, existing: &[Route]) -> Reconciliation {
    let candidate = Route::from_addresses(
        None,
        desired.network,
        desired.subnet_mask,
        desired.gateway,
        false,
    );

    let (mut route, created) = match existing.iter().find(|r| candidate.has_same_parameters(r)) {
        Some(found) => (found.clone(), false),
        None => {
            let initial = match desired.mode {
                ActiveMode::Explicit(active) => active,
                ActiveMode::Toggle => true,
            };
            let appended = Route::from_addresses(
                Some(existing.len()),
                desired.network,
                desired.subnet_mask,
                desired.gateway,
                initial,
            );
            (appended, true)
        }
    };

    let active = match desired.mode {
        ActiveMode::Toggle if !created => !route.is_active(),
        ActiveMode::Toggle => route.is_active(),
        ActiveMode::Explicit(active) => active,
    };
    route.set_active(active);

    tracing::debug!(
        "Reconciled {} ({})",
        route,
        if created { "new entry" } else { "existing entry" }
    );

    Reconciliation { route, created }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desired(network: &str, mode: ActiveMode) -> DesiredRoute {
        DesiredRoute {
            network: network.parse().unwrap(),
            subnet_mask: "255.255.255.0".parse().unwrap(),
            gateway: "192.168.178.2".parse().unwrap(),
            mode,
        }
    }

    fn table() -> Vec<Route> {
        vec![
            Route::new(Some(0), "10.1.0.0", "255.255.255.0", "192.168.178.2", true).unwrap(),
            Route::new(Some(1), "10.2.0.0", "255.255.255.0", "192.168.178.2", false).unwrap(),
            Route::new(Some(2), "10.3.0.0", "255.255.255.0", "192.168.178.2", true).unwrap(),
        ]
    }

    #[test]
    fn test_new_route_appends_at_table_length() {
        let all = table();
        for len in 0..=all.len() {
            let existing = &all[..len];
            let result = reconcile(&desired("10.9.0.0", ActiveMode::default()), existing);
            assert!(result.created);
            assert_eq!(result.route.index(), Some(len));
            assert!(result.route.is_active());
        }
    }

    #[test]
    fn test_new_route_explicit_inactive() {
        let result = reconcile(&desired("10.9.0.0", ActiveMode::Explicit(false)), &table());
        assert!(result.created);
        assert!(!result.route.is_active());
    }

    #[test]
    fn test_toggle_on_new_route_uses_default() {
        let result = reconcile(&desired("10.9.0.0", ActiveMode::Toggle), &[]);
        assert!(result.created);
        assert!(result.route.is_active());
    }

    #[test]
    fn test_toggle_inverts_existing() {
        let existing = table();

        let result = reconcile(&desired("10.1.0.0", ActiveMode::Toggle), &existing);
        assert!(!result.created);
        assert_eq!(result.route.index(), Some(0));
        assert!(!result.route.is_active());

        let result = reconcile(&desired("10.2.0.0", ActiveMode::Toggle), &existing);
        assert_eq!(result.route.index(), Some(1));
        assert!(result.route.is_active());
    }

    #[test]
    fn test_explicit_mode_is_idempotent() {
        let mut existing = table();
        let want = desired("10.2.0.0", ActiveMode::Explicit(true));

        let first = reconcile(&want, &existing);
        existing[1] = first.route.clone();
        let second = reconcile(&want, &existing);

        assert_eq!(first.route, second.route);
        assert!(second.route.is_active());
        assert!(!second.created);
    }

    #[test]
    fn test_first_match_wins() {
        let mut existing = table();
        existing.push(
            Route::new(Some(3), "10.2.0.0", "255.255.255.0", "192.168.178.2", true).unwrap(),
        );
        let result = reconcile(&desired("10.2.0.0", ActiveMode::Toggle), &existing);
        assert_eq!(result.route.index(), Some(1));
        assert!(result.route.is_active());
    }

    #[test]
    fn test_existing_table_is_not_modified() {
        let existing = table();
        let _ = reconcile(&desired("10.1.0.0", ActiveMode::Explicit(false)), &existing);
        assert!(existing[0].is_active());
    }
}
