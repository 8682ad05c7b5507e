//! Static templates: group names, destination categories, rule providers,
//! DNS policy and the fixed parts of the rule list.

use crate::config::dns::Dns;
use crate::config::rule_provider::{Behavior, ProviderFormat, RuleProvider};
use crate::config::util::DIRECT;

pub const HEALTH_CHECK_URL: &str = "http://www.apple.com/library/test/success.html";

/// Refresh interval of every rule provider, in seconds
pub const RULE_INTERVAL: u32 = 86400;

const IR_BASE: &str = "https://raw.githubusercontent.com/Chocolate4U/Iran-clash-rules/release";
const ZULUION_BASE: &str = "https://cdn.jsdelivr.net/gh/zuluion/Clash-Template-Config@master/Filter";
const QURE_BASE: &str = "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color";

// ============================================================================
// Groups
// ============================================================================

pub const MAIN_GROUP: &str = "🚀 Main Proxy";
pub const AUTO_GROUP: &str = "♻️ Auto Best";
pub const FALLBACK_GROUP: &str = "🔄 Fallback";
/// Local bypass
pub const LOCAL_GROUP: &str = "🇮🇷 Iran Direct";
pub const ADBLOCK_GROUP: &str = "🚫 Ad Block";

pub const AUTO_INTERVAL: u32 = 180;
pub const AUTO_TOLERANCE: u32 = 80;
pub const FALLBACK_INTERVAL: u32 = 120;

/// Per-proxy latency test timeout, in seconds
pub const BENCHMARK_TIMEOUT: u32 = 5;

/// Full icon URL for an icon file.
pub fn icon(file: &str) -> String {
    format!("{}/{}", QURE_BASE, file)
}

/// Choices offered by a category group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    /// Main, auto, fallback
    Proxied,
    /// Main, auto
    ProxiedFast,
    /// Direct first, then main and auto
    DirectFirst,
}

impl Menu {
    pub fn members(self) -> Vec<String> {
        let members: &[&str] = match self {
            Menu::Proxied => &[MAIN_GROUP, AUTO_GROUP, FALLBACK_GROUP],
            Menu::ProxiedFast => &[MAIN_GROUP, AUTO_GROUP],
            Menu::DirectFirst => &[DIRECT, MAIN_GROUP, AUTO_GROUP],
        };
        members.iter().map(|m| m.to_string()).collect()
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Remote list backing a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySource {
    /// IP list from the regional repo, matched without resolving
    RegionalCidr {
        provider: &'static str,
        file: &'static str,
    },
    /// Classical rule file from the filter repo
    Classical {
        provider: &'static str,
        file: &'static str,
    },
}

impl CategorySource {
    pub fn provider_name(self) -> &'static str {
        match self {
            CategorySource::RegionalCidr { provider, .. }
            | CategorySource::Classical { provider, .. } => provider,
        }
    }

    pub fn rule_provider(self) -> RuleProvider {
        match self {
            CategorySource::RegionalCidr { file, .. } => regional(Behavior::Ipcidr, file),
            CategorySource::Classical { file, .. } => RuleProvider::http(
                Behavior::Classical,
                format!("{}/{}", ZULUION_BASE, file),
                RULE_INTERVAL,
            ),
        }
    }
}

/// A destination category with its own selector group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Key used in the generator config
    pub key: &'static str,
    pub group: &'static str,
    pub icon: &'static str,
    pub menu: Menu,
    pub source: CategorySource,
    /// Literal suffixes routed to the group after the rule-set
    pub domain_suffixes: &'static [&'static str],
}

const fn classical(
    key: &'static str,
    group: &'static str,
    icon: &'static str,
    menu: Menu,
    provider: &'static str,
    file: &'static str,
) -> Category {
    Category {
        key,
        group,
        icon,
        menu,
        source: CategorySource::Classical { provider, file },
        domain_suffixes: &[],
    }
}

/// Every category, in group and rule order.
pub const CATEGORIES: &[Category] = &[
    Category {
        key: "telegram",
        group: "✈️ Telegram",
        icon: "Telegram.png",
        menu: Menu::Proxied,
        source: CategorySource::RegionalCidr {
            provider: "telegram-cidr",
            file: "telegram.txt",
        },
        domain_suffixes: &["t.me", "telegram.me", "telegram.org"],
    },
    classical("openai", "🤖 OpenAI", "ChatGPT.png", Menu::ProxiedFast, "OpenAI", "OpenAI.yaml"),
    classical("claude", "🤖 Claude", "Claude.png", Menu::ProxiedFast, "Claude", "Claude.yaml"),
    classical("gemini", "🤖 Gemini", "AI.png", Menu::ProxiedFast, "Gemini", "Gemini.yaml"),
    classical("instagram", "📸 Instagram", "Instagram.png", Menu::Proxied, "Instagram", "Facebook.yaml"),
    classical("twitter", "🐦 Twitter", "Twitter.png", Menu::Proxied, "Twitter", "Twitter.yaml"),
    classical("discord", "💬 Discord", "Discord.png", Menu::Proxied, "Discord", "Discord.yaml"),
    classical("google", "🔍 Google", "Google.png", Menu::Proxied, "Google", "Google.yaml"),
    classical("youtube", "📺 YouTube", "YouTube.png", Menu::Proxied, "YouTube", "YouTube.yaml"),
    classical("github", "🐙 GitHub", "GitHub.png", Menu::Proxied, "GitHub", "GitHub.yaml"),
    classical("netflix", "🎬 Netflix", "Netflix.png", Menu::Proxied, "Netflix", "Netflix.yaml"),
    classical("disney", "🎬 Disney+", "Disney+_1.png", Menu::Proxied, "Disney", "DisneyPlus.yaml"),
    classical("spotify", "🎵 Spotify", "Spotify.png", Menu::Proxied, "Spotify", "Spotify.yaml"),
    classical("apple", "🍎 Apple", "Apple_1.png", Menu::DirectFirst, "Apple", "Apple.yaml"),
    classical("microsoft", "🪟 Microsoft", "Microsoft.png", Menu::DirectFirst, "Microsoft", "Microsoft.yaml"),
    classical("steam", "🎮 Steam", "Steam.png", Menu::DirectFirst, "Steam", "Steam.yaml"),
    classical("speedtest", "🚦 Speedtest", "Speedtest.png", Menu::DirectFirst, "Speedtest", "Speedtest.yaml"),
];

/// Looks up a category by its config key.
pub fn category(key: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Comma-separated list of category keys, for error messages.
pub fn category_keys() -> String {
    CATEGORIES
        .iter()
        .map(|c| c.key)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Rule Providers
// ============================================================================

pub const ADS_PROVIDER: &str = "ads";

/// Regional lists routed to the local bypass group, in rule order.
/// The flag marks IP lists that must not trigger resolution.
pub const LOCAL_PROVIDERS: &[(&str, bool)] = &[
    ("iran-domains", false),
    ("iran-direct", false),
    ("iran-cidr", true),
];

fn regional(behavior: Behavior, file: &str) -> RuleProvider {
    RuleProvider::http(behavior, format!("{}/{}", IR_BASE, file), RULE_INTERVAL)
        .with_format(ProviderFormat::Text)
}

/// Providers that do not belong to a category, in emission order.
pub fn base_providers() -> Vec<(&'static str, RuleProvider)> {
    vec![
        ("iran-domains", regional(Behavior::Domain, "ir.txt")),
        ("iran-direct", regional(Behavior::Domain, "direct.txt")),
        ("iran-cidr", regional(Behavior::Ipcidr, "ircidr.txt")),
        (ADS_PROVIDER, regional(Behavior::Domain, "ads.txt")),
    ]
}

// ============================================================================
// Rules
// ============================================================================

/// Script shortcut matching QUIC traffic
pub const QUIC_SHORTCUT: &str = "quic";
pub const QUIC_EXPRESSION: &str = "network == 'udp' and dst_port == 443";

/// Private and carrier-grade NAT ranges
pub const PRIVATE_CIDRS: &[&str] = &[
    "192.168.0.0/16",
    "10.0.0.0/8",
    "172.16.0.0/12",
    "127.0.0.0/8",
    "100.64.0.0/10",
];

/// Country code of the local region for GEOIP
pub const LOCAL_COUNTRY: &str = "IR";

// ============================================================================
// DNS
// ============================================================================

const REGIONAL_DNS: &str = "178.22.122.100";
const SECURE_DOH: &str = "https://dns.google/dns-query";

const REGIONAL_DOMAINS: &[&str] = &[
    "+.ir",
    "+.aparat.com",
    "+.digikala.com",
    "+.snapp.ir",
    "+.tapsi.ir",
    "+.divar.ir",
];

const SECURE_DOMAINS: &[&str] = &[
    "+.google.com",
    "+.googleapis.com",
    "+.youtube.com",
    "+.instagram.com",
    "+.telegram.org",
    "+.github.com",
    "+.twitter.com",
    "+.x.com",
    "+.openai.com",
];

const FAKE_IP_FILTER: &[&str] = &[
    "+.stun.*.*",
    "+.stun.*.*.*",
    "+.stun.*.*.*.*",
    "lens.l.google.com",
    "stun.l.google.com",
    "*.n.n.srv.nintendo.net",
    "+.stun.playstation.net",
    "xbox.*.*.microsoft.com",
    "*.*.xboxlive.com",
    "*.msftncsi.com",
    "*.msftconnecttest.com",
    "msftconnecttest.com",
    "time.*.com",
    "time.*.apple.com",
    "+.pool.ntp.org",
];

const LOCAL_SUFFIXES: &[&str] = &["*.local", "*.localhost", "*.lan", "*.home.arpa", "localhost"];

/// Regional domains go to the regional resolver, sensitive foreign
/// domains to DoH.
pub fn dns() -> Dns {
    let mut dns = Dns {
        default_nameserver: vec![REGIONAL_DNS.to_string(), "8.8.8.8".to_string()],
        nameserver: vec![
            "https://dns.shecan.ir/dns-query".to_string(),
            "https://doh.403.online/dns-query".to_string(),
            SECURE_DOH.to_string(),
        ],
        ..Default::default()
    };
    dns.add_policy(REGIONAL_DOMAINS.iter().copied(), REGIONAL_DNS);
    dns.add_policy(SECURE_DOMAINS.iter().copied(), SECURE_DOH);
    dns.fake_ip_filter = FAKE_IP_FILTER
        .iter()
        .chain(REGIONAL_DOMAINS)
        .chain(LOCAL_SUFFIXES)
        .map(|s| s.to_string())
        .collect();
    dns
}
