//! Route guard: maps (required roles, session state) to a navigation outcome.
//!
//! The evaluation order below is a behavioral contract, not an optimization
//! detail. In particular, an authenticated user whose role has not arrived
//! yet (the role fetch is detached on ongoing auth changes) must land in
//! `CheckingPermissions`, not in a redirect: folding that branch into the
//! unauthenticated or denied branches either locks out a legitimate user or
//! grants access off stale data.

use hims_core::UserId;

use crate::roles::Role;

/// Snapshot of the session store as the guard sees it.
///
/// - No IO
/// - No panics
/// - Re-evaluated fresh on every navigation and every store change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    pub user: Option<UserId>,
    pub role: Option<Role>,
    pub is_loading: bool,
}

impl SessionView {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            role: None,
            is_loading: false,
        }
    }

    pub fn loading() -> Self {
        Self {
            user: None,
            role: None,
            is_loading: true,
        }
    }
}

/// Outcome of guarding one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Render the protected content.
    Render,
    /// Session bootstrap has not finished; show the loading placeholder.
    Loading,
    /// User is authenticated but the role has not arrived yet; show the
    /// "checking permissions" placeholder. Never a redirect.
    CheckingPermissions,
    /// Not authenticated; the original location is carried so the login
    /// flow can return the user afterwards.
    RedirectToLogin { from: String },
    /// Authenticated but the role is not in the view's required set.
    RedirectToDenied,
}

/// Decide the outcome for a view with an optional required-role set.
///
/// `required = None` means "any authenticated user".
pub fn evaluate(required: Option<&[Role]>, view: &SessionView, location: &str) -> RouteOutcome {
    if view.is_loading {
        return RouteOutcome::Loading;
    }

    let Some(_user) = view.user else {
        return RouteOutcome::RedirectToLogin {
            from: location.to_string(),
        };
    };

    if let Some(allowed) = required {
        let Some(role) = view.role else {
            // Role lags user on ongoing auth changes; wait, don't redirect.
            return RouteOutcome::CheckingPermissions;
        };
        if !allowed.contains(&role) {
            return RouteOutcome::RedirectToDenied;
        }
    }

    RouteOutcome::Render
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user_view(role: Option<Role>) -> SessionView {
        SessionView {
            user: Some(UserId::new()),
            role,
            is_loading: false,
        }
    }

    #[test]
    fn loading_wins_over_everything() {
        // Even a cached user/role must not short-circuit the bootstrap gate.
        let view = SessionView {
            user: Some(UserId::new()),
            role: Some(Role::Admin),
            is_loading: true,
        };
        assert_eq!(
            evaluate(Some(&[Role::Admin]), &view, "/reports"),
            RouteOutcome::Loading
        );
        assert_eq!(evaluate(None, &view, "/"), RouteOutcome::Loading);
    }

    #[test]
    fn unauthenticated_redirects_to_login_with_origin() {
        let view = SessionView::anonymous();
        assert_eq!(
            evaluate(Some(&[Role::Admin, Role::Warden]), &view, "/students"),
            RouteOutcome::RedirectToLogin {
                from: "/students".to_string()
            }
        );
        assert_eq!(
            evaluate(None, &view, "/settings"),
            RouteOutcome::RedirectToLogin {
                from: "/settings".to_string()
            }
        );
    }

    #[test]
    fn pending_role_waits_instead_of_redirecting() {
        let view = user_view(None);
        assert_eq!(
            evaluate(Some(&[Role::Admin]), &view, "/reports"),
            RouteOutcome::CheckingPermissions
        );
    }

    #[test]
    fn role_outside_required_set_is_denied() {
        // view requires {admin}; store = {user, role: warden}
        let view = user_view(Some(Role::Warden));
        assert_eq!(
            evaluate(Some(&[Role::Admin]), &view, "/reports"),
            RouteOutcome::RedirectToDenied
        );
    }

    #[test]
    fn role_in_required_set_renders() {
        let view = user_view(Some(Role::Warden));
        assert_eq!(
            evaluate(Some(&[Role::Admin, Role::Warden]), &view, "/inventory"),
            RouteOutcome::Render
        );
    }

    #[test]
    fn view_without_required_set_ignores_missing_role() {
        // Authenticated user with no role record renders unrestricted views
        // immediately.
        let view = user_view(None);
        assert_eq!(evaluate(None, &view, "/"), RouteOutcome::Render);
    }

    fn arb_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn arb_view() -> impl Strategy<Value = SessionView> {
        (
            prop::option::of(Just(())),
            prop::option::of(arb_role()),
            any::<bool>(),
        )
            .prop_map(|(user, role, is_loading)| SessionView {
                user: user.map(|()| UserId::new()),
                role,
                is_loading,
            })
    }

    fn arb_required() -> impl Strategy<Value = Option<Vec<Role>>> {
        prop::option::of(prop::collection::vec(arb_role(), 0..=3))
    }

    proptest! {
        #[test]
        fn loading_is_terminal(required in arb_required(), view in arb_view()) {
            prop_assume!(view.is_loading);
            prop_assert_eq!(
                evaluate(required.as_deref(), &view, "/x"),
                RouteOutcome::Loading
            );
        }

        #[test]
        fn anonymous_always_redirects_to_login(required in arb_required(), role in prop::option::of(arb_role())) {
            let view = SessionView { user: None, role, is_loading: false };
            prop_assert_eq!(
                evaluate(required.as_deref(), &view, "/x"),
                RouteOutcome::RedirectToLogin { from: "/x".to_string() }
            );
        }

        #[test]
        fn resolved_role_renders_iff_member(allowed in prop::collection::vec(arb_role(), 0..=3), role in arb_role()) {
            let view = SessionView {
                user: Some(UserId::new()),
                role: Some(role),
                is_loading: false,
            };
            let expected = if allowed.contains(&role) {
                RouteOutcome::Render
            } else {
                RouteOutcome::RedirectToDenied
            };
            prop_assert_eq!(evaluate(Some(&allowed), &view, "/x"), expected);
        }

        #[test]
        fn authenticated_never_bounced_to_login(required in arb_required(), role in prop::option::of(arb_role())) {
            let view = SessionView {
                user: Some(UserId::new()),
                role,
                is_loading: false,
            };
            let outcome = evaluate(required.as_deref(), &view, "/x");
            let bounced_to_login = matches!(outcome, RouteOutcome::RedirectToLogin { .. });
            prop_assert!(!bounced_to_login);
        }
    }
}
