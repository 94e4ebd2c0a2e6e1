use std::sync::Arc;

use crate::feed::Feed;

/// The unit of transfer granularity at a stop: a stop hosts one platform
/// per `route_type` unless route-specific transfer rules mention it, in
/// which case it hosts one platform per `route_id` (§3).
///
/// A closed sum with structural equality — match on the tag, never on a
/// runtime type test (§9).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlatformDescriptor {
    RouteTypePlatform {
        feed_id: Arc<str>,
        stop_id: Arc<str>,
        route_type: i32,
    },
    RoutePlatform {
        feed_id: Arc<str>,
        stop_id: Arc<str>,
        route_id: Arc<str>,
    },
}

impl PlatformDescriptor {
    pub fn stop_id(&self) -> &Arc<str> {
        match self {
            PlatformDescriptor::RouteTypePlatform { stop_id, .. } => stop_id,
            PlatformDescriptor::RoutePlatform { stop_id, .. } => stop_id,
        }
    }

    /// The feed this platform belongs to. Reconstruction reads this off
    /// ENTER_PT and TRANSFER edges via `platform_descriptor_by_edge` (§4.5).
    pub fn feed_id(&self) -> &Arc<str> {
        match self {
            PlatformDescriptor::RouteTypePlatform { feed_id, .. } => feed_id,
            PlatformDescriptor::RoutePlatform { feed_id, .. } => feed_id,
        }
    }

    /// The route id this platform is scoped to, if it's a per-route
    /// platform. Used by the `route_id_or_null` matching rule in §4.3.4.
    pub fn route_id(&self) -> Option<&Arc<str>> {
        match self {
            PlatformDescriptor::RouteTypePlatform { .. } => None,
            PlatformDescriptor::RoutePlatform { route_id, .. } => Some(route_id),
        }
    }

    /// Resolves this platform's route type, looking the route up in the
    /// feed when the platform is scoped to a single route rather than a
    /// route type (used by the `route_type(platform)` rule in §4.3.1,
    /// §4.3.3, §4.3.4 to tag always-valid edges with a mode discriminator).
    pub fn route_type(&self, feed: &impl Feed) -> i32 {
        match self {
            PlatformDescriptor::RouteTypePlatform { route_type, .. } => *route_type,
            PlatformDescriptor::RoutePlatform { route_id, .. } => feed
                .route(route_id)
                .map(|r| r.route_type)
                .unwrap_or_default(),
        }
    }

    /// Picks the platform for a stop-time: route-specific when the stop has
    /// route-specific departure transfer rules, route-type otherwise
    /// (§4.2).
    pub fn select(
        feed_id: Arc<str>,
        stop_id: Arc<str>,
        route_id: Arc<str>,
        route_type: i32,
        has_route_specific_rules: bool,
    ) -> Self {
        if has_route_specific_rules {
            PlatformDescriptor::RoutePlatform {
                feed_id,
                stop_id,
                route_id,
            }
        } else {
            PlatformDescriptor::RouteTypePlatform {
                feed_id,
                stop_id,
                route_type,
            }
        }
    }
}
