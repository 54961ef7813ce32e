// Local input validation shared by creation endpoints and rule submission.
//
// These are pattern checks, not semantic ones: the remote API remains the
// authority on whether a subnet is routable or a name is taken. Patterns
// are anchored; the upstream service documents the same character sets.

use std::sync::LazyLock;

use regex::Regex;

/// Resource names (networks, machines): 1-32 letters, digits, hyphens.
static RESOURCE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9-]{1,32}$").expect("hardcoded pattern compiles")
});

/// Inbound rule names additionally allow underscores.
static RULE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]{1,32}$").expect("hardcoded pattern compiles")
});

/// Dotted-quad CIDR, e.g. `10.1.0.0/24`.
static CIDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}/[0-9]{1,2}$")
        .expect("hardcoded pattern compiles")
});

/// Dotted-quad IPv4 address.
static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$")
        .expect("hardcoded pattern compiles")
});

pub(crate) fn resource_name(name: &str) -> bool {
    RESOURCE_NAME.is_match(name)
}

pub(crate) fn rule_name(name: &str) -> bool {
    RULE_NAME.is_match(name)
}

pub(crate) fn cidr(subnet: &str) -> bool {
    CIDR.is_match(subnet)
}

pub(crate) fn ipv4(addr: &str) -> bool {
    IPV4.is_match(addr)
}
