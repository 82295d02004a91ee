use crate::types::worker::{Destination, ResourceRequest};

/// Which of the two cache generations a policy reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Static,
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Serve a cached copy without touching the network; fetch and store on
    /// a miss.
    CacheFirst(Generation),
    /// Always try the network, storing successes; fall back to the cached
    /// copy when the network fails.
    NetworkFirst(Generation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMatcher {
    PathPrefix(String),
    Destination(Destination),
    Any,
}

impl RequestMatcher {
    pub fn matches(&self, request: &ResourceRequest) -> bool {
        match self {
            RequestMatcher::PathPrefix(prefix) => request.url.path().starts_with(prefix.as_str()),
            RequestMatcher::Destination(destination) => request.destination == *destination,
            RequestMatcher::Any => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub matcher: RequestMatcher,
    pub policy: CachePolicy,
}

impl ClassificationRule {
    pub fn new(matcher: RequestMatcher, policy: CachePolicy) -> Self {
        Self { matcher, policy }
    }
}

/// API calls go network-first into their own generation; everything else is
/// an app-shell asset served cache-first.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(
            RequestMatcher::PathPrefix("/api/".to_string()),
            CachePolicy::NetworkFirst(Generation::Api),
        ),
        ClassificationRule::new(RequestMatcher::Any, CachePolicy::CacheFirst(Generation::Static)),
    ]
}

/// First matching rule wins; `None` sends the request straight to the
/// network.
pub fn classify(rules: &[ClassificationRule], request: &ResourceRequest) -> Option<CachePolicy> {
    rules
        .iter()
        .find(|rule| rule.matcher.matches(request))
        .map(|rule| rule.policy)
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use url::Url;

    fn request(url: &str, destination: Destination) -> ResourceRequest {
        ResourceRequest::get(Url::parse(url).expect("url"), destination)
    }

    #[test]
    fn classify__should_send_api_paths_network_first() {
        let policy = classify(
            &default_rules(),
            &request("https://shop.example/api/products", Destination::Empty),
        );

        assert_eq!(policy, Some(CachePolicy::NetworkFirst(Generation::Api)));
    }

    #[test]
    fn classify__should_not_match_api_substring_outside_path_prefix() {
        let policy = classify(
            &default_rules(),
            &request("https://shop.example/docs/api/intro", Destination::Document),
        );

        assert_eq!(policy, Some(CachePolicy::CacheFirst(Generation::Static)));
    }

    #[test]
    fn classify__should_honour_rule_order() {
        // Given
        let rules = vec![
            ClassificationRule::new(
                RequestMatcher::Destination(Destination::Image),
                CachePolicy::NetworkFirst(Generation::Static),
            ),
            ClassificationRule::new(RequestMatcher::Any, CachePolicy::CacheFirst(Generation::Static)),
        ];

        // Then
        assert_eq!(
            classify(&rules, &request("https://shop.example/a.png", Destination::Image)),
            Some(CachePolicy::NetworkFirst(Generation::Static))
        );
        assert_eq!(
            classify(&rules, &request("https://shop.example/a.css", Destination::Style)),
            Some(CachePolicy::CacheFirst(Generation::Static))
        );
    }

    #[test]
    fn classify__should_return_none_without_matching_rule() {
        let rules = vec![ClassificationRule::new(
            RequestMatcher::PathPrefix("/api/".to_string()),
            CachePolicy::NetworkFirst(Generation::Api),
        )];

        assert_eq!(
            classify(&rules, &request("https://shop.example/", Destination::Document)),
            None
        );
    }
}
