/// Route suffixes that mark a parameterized action page (`/team/edit/<id>`).
const ACTION_SUFFIXES: [&str; 2] = ["/edit", "/create"];

/// Segments that qualify a request path for an action pattern.
const ACTION_SEGMENTS: [&str; 2] = ["/edit/", "/create/"];

/// MatchKind
///
/// How a single route pattern compares against a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    /// The request path must equal the route.
    Exact,
    /// The route ends in `/edit` or `/create`. Besides an exact hit, any path
    /// under `prefix` that contains `/edit/` or `/create/` anywhere matches.
    ///
    /// The segment check runs over the whole path, so `/dashboard/team/x/edit/1`
    /// also matches `/dashboard/team/edit`, and a `create` route accepts `edit`
    /// paths under the same parent.
    Action { prefix: String },
}

/// RoutePattern
///
/// One compiled entry of the permission table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    route: String,
    kind: MatchKind,
}

impl RoutePattern {
    pub fn compile(route: &str) -> Self {
        let kind = ACTION_SUFFIXES
            .iter()
            .find_map(|suffix| route.strip_suffix(suffix))
            .map(|parent| MatchKind::Action {
                prefix: format!("{parent}/"),
            })
            .unwrap_or(MatchKind::Exact);

        Self {
            route: route.to_string(),
            kind,
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn kind(&self) -> &MatchKind {
        &self.kind
    }

    pub fn matches(&self, path: &str) -> bool {
        if path == self.route {
            return true;
        }
        match &self.kind {
            MatchKind::Exact => false,
            MatchKind::Action { prefix } => {
                path.starts_with(prefix.as_str())
                    && ACTION_SEGMENTS.iter().any(|segment| path.contains(segment))
            }
        }
    }
}

/// RouteMatcher
///
/// A compiled route list; matches when any of its patterns does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatcher {
    patterns: Vec<RoutePattern>,
}

impl RouteMatcher {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: routes
                .into_iter()
                .map(|route| RoutePattern::compile(route.as_ref()))
                .collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }

    pub fn patterns(&self) -> &[RoutePattern] {
        &self.patterns
    }
}

/// One-shot form of `RouteMatcher::matches` for callers holding raw route strings.
pub fn path_matches(path: &str, routes: &[String]) -> bool {
    routes
        .iter()
        .any(|route| RoutePattern::compile(route).matches(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_plain_route_is_exact() {
        let pattern = RoutePattern::compile("/dashboard/team");
        assert_eq!(pattern.kind(), &MatchKind::Exact);
        assert!(pattern.matches("/dashboard/team"));
        assert!(!pattern.matches("/dashboard/team/42"));
        assert!(!pattern.matches("/dashboard/teams"));
    }

    #[test]
    fn test_compile_edit_and_create_routes() {
        let edit = RoutePattern::compile("/dashboard/team/edit");
        assert_eq!(
            edit.kind(),
            &MatchKind::Action {
                prefix: "/dashboard/team/".to_string()
            }
        );

        let create = RoutePattern::compile("/dashboard/gallery/create");
        assert_eq!(
            create.kind(),
            &MatchKind::Action {
                prefix: "/dashboard/gallery/".to_string()
            }
        );
    }

    #[test]
    fn test_action_pattern_matches_parameterized_subroutes() {
        let pattern = RoutePattern::compile("/dashboard/team/edit");
        assert!(pattern.matches("/dashboard/team/edit"));
        assert!(pattern.matches("/dashboard/team/edit/42"));
        assert!(!pattern.matches("/dashboard/team/42"));
        assert!(!pattern.matches("/dashboard/users/edit/42"));
    }

    #[test]
    fn test_action_pattern_is_loose_about_segment_position() {
        // The segment may appear anywhere below the parent, not only right after it.
        let pattern = RoutePattern::compile("/dashboard/team/edit");
        assert!(pattern.matches("/dashboard/team/whatever/edit/x"));
        // A create route accepts edit paths under the same parent.
        let create = RoutePattern::compile("/dashboard/team/create");
        assert!(create.matches("/dashboard/team/edit/7"));
    }

    #[test]
    fn test_trailing_action_without_parameter_does_not_match_loosely() {
        let pattern = RoutePattern::compile("/dashboard/gallery/create");
        // `/create` with no trailing slash is not the `/create/` segment.
        assert!(!pattern.matches("/dashboard/gallery/x/create"));
    }

    #[test]
    fn test_route_matcher_any_semantics() {
        let matcher = RouteMatcher::new(["/dashboard/exams", "/dashboard/team/edit"]);
        assert_eq!(matcher.patterns().len(), 2);
        assert!(matcher.matches("/dashboard/exams"));
        assert!(matcher.matches("/dashboard/team/edit/1"));
        assert!(!matcher.matches("/dashboard/admin"));
        assert!(!RouteMatcher::default().matches("/dashboard/exams"));
    }

    #[test]
    fn test_path_matches_helper() {
        let routes = vec!["/dashboard/users/edit".to_string()];
        assert!(path_matches("/dashboard/users/edit/abc", &routes));
        assert!(!path_matches("/dashboard/users", &routes));
    }
}
