//! Caller-supplied forward proxies for the outbound provider call

use rand::Rng;
use serde::Deserialize;
use url::Url;

use crate::error::{Result, TtsError};

/// `proxies` as sent by the client: a single string or a list of strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyList(pub Vec<String>);

impl ProxyList {
    /// True when no entry holds a usable value
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|p| p.trim().is_empty())
    }
}

impl<'de> Deserialize<'de> for ProxyList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de;

        struct ProxyListVisitor;

        impl<'de> de::Visitor<'de> for ProxyListVisitor {
            type Value = ProxyList;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a proxy URL or an array of proxy URLs")
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<ProxyList, E>
            where
                E: de::Error,
            {
                Ok(ProxyList(vec![v.to_string()]))
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<ProxyList, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(val) = seq.next_element::<String>()? {
                    values.push(val);
                }
                Ok(ProxyList(values))
            }
        }

        deserializer.deserialize_any(ProxyListVisitor)
    }
}

/// How the outbound call for one request is routed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProxySelection {
    /// Straight to the provider
    #[default]
    Direct,
    /// Always through this proxy
    Fixed(Url),
    /// Through one of these, chosen uniformly per request
    Random(Vec<Url>),
}

impl ProxySelection {
    /// Resolve the request's `proxy` and `proxies` fields
    ///
    /// A non-empty `proxies` list takes precedence over `proxy`. Blank entries
    /// are ignored; anything else must be an `http` or `https` URL.
    pub fn from_fields(proxy: Option<&str>, proxies: Option<&ProxyList>) -> Result<Self> {
        let mut list = proxies
            .map(|list| {
                list.0
                    .iter()
                    .map(|p| p.trim())
                    .filter(|p| !p.is_empty())
                    .map(parse_proxy)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        if list.len() > 1 {
            return Ok(Self::Random(list));
        }

        if let Some(only) = list.pop() {
            return Ok(Self::Fixed(only));
        }

        match proxy.map(str::trim).filter(|p| !p.is_empty()) {
            Some(proxy) => Ok(Self::Fixed(parse_proxy(proxy)?)),
            None => Ok(Self::Direct),
        }
    }

    /// Proxy to use for this call, if any
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Url> {
        match self {
            Self::Direct => None,
            Self::Fixed(url) => Some(url),
            Self::Random(urls) => pick(urls, rng),
        }
    }
}

/// Uniformly pick one element, `None` for an empty slice
pub fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }

    items.get(rng.random_range(0..items.len()))
}

/// Host and port of a proxy, safe to log (credentials stripped)
pub fn display_proxy(url: &Url) -> String {
    match (url.host_str(), url.port_or_known_default()) {
        (Some(host), Some(port)) => format!("{}://{host}:{port}", url.scheme()),
        (Some(host), None) => format!("{}://{host}", url.scheme()),
        _ => url.scheme().to_string(),
    }
}

fn parse_proxy(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| TtsError::InvalidRequest(format!("Invalid proxy URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TtsError::InvalidRequest(format!(
            "Unsupported proxy scheme '{}', expected http or https",
            url.scheme()
        )));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(TtsError::InvalidRequest("Invalid proxy URL: missing host".to_string()));
    }

    Ok(url)
}
