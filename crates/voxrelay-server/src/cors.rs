use http::{Method, header::HeaderName};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use voxrelay_config::{AnyOrArray, CorsConfig};

/// Build a Tower CORS layer from configuration
///
/// Unparseable list entries are skipped with a warning rather than failing
/// startup.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    layer = match &config.origins {
        AnyOrArray::Any => layer.allow_origin(AllowOrigin::any()),
        AnyOrArray::List(origins) => layer.allow_origin(parse_all::<http::HeaderValue>(origins, "origin")),
    };

    layer = match &config.methods {
        AnyOrArray::Any => layer.allow_methods(AllowMethods::any()),
        AnyOrArray::List(methods) => layer.allow_methods(parse_all::<Method>(methods, "method")),
    };

    layer = match &config.headers {
        AnyOrArray::Any => layer.allow_headers(AllowHeaders::any()),
        AnyOrArray::List(headers) => layer.allow_headers(parse_all::<HeaderName>(headers, "header")),
    };

    if !config.expose_headers.is_empty() {
        layer = layer.expose_headers(parse_all::<HeaderName>(&config.expose_headers, "expose header"));
    }

    // Credentials cannot be combined with wildcards; tower-http panics on that
    // pairing, so it is only honored for explicit lists.
    if config.credentials {
        if config.origins == AnyOrArray::Any || config.headers == AnyOrArray::Any || config.methods == AnyOrArray::Any {
            tracing::warn!("cors.credentials ignored: requires explicit origins, methods and headers");
        } else {
            layer = layer.allow_credentials(true);
        }
    }

    if let Some(duration) = config.max_age_duration() {
        layer = layer.max_age(duration);
    }

    layer
}

fn parse_all<T: std::str::FromStr>(values: &[String], kind: &str) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                tracing::warn!(%value, kind, "ignoring invalid CORS entry");
            }
            parsed
        })
        .collect()
}
