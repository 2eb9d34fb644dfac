//! IPv4 CIDR arithmetic for the resource allocator. No external `ipnetwork`
//! crate is pulled in for this — the handful of operations needed (parse,
//! format, host enumeration, child-subnet enumeration, bit-width sizing) are
//! small enough to own directly, mirroring the `IPNetwork`-based math the
//! allocator's source algorithm performs (`numOfBits = ceil(log2(n))`,
//! `.subnet(cidr)`, `.iter_hosts()`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CidrError {
    #[error("invalid IPv4 CIDR syntax: {0}")]
    InvalidSyntax(String),
    #[error("prefix length out of range: /{0}")]
    InvalidPrefixLength(u32),
}

/// Parse `"a.b.c.d"` or `"a.b.c.d/nn"` into a (network address, prefix length)
/// pair. A bare address (no `/nn`) is treated as a /32.
pub fn parse_cidr(s: &str) -> Result<(u32, u8), CidrError> {
    let (addr_part, prefix_part) = match s.split_once('/') {
        Some((a, p)) => (a, Some(p)),
        None => (s, None),
    };
    let addr = parse_ipv4(addr_part)?;
    let prefix_len = match prefix_part {
        Some(p) => {
            let n: u32 = p.parse().map_err(|_| CidrError::InvalidSyntax(s.to_string()))?;
            if n > 32 {
                return Err(CidrError::InvalidPrefixLength(n));
            }
            n as u8
        }
        None => 32,
    };
    Ok((addr, prefix_len))
}

pub fn parse_ipv4(s: &str) -> Result<u32, CidrError> {
    let octets: Vec<&str> = s.split('.').collect();
    if octets.len() != 4 {
        return Err(CidrError::InvalidSyntax(s.to_string()));
    }
    let mut addr: u32 = 0;
    for octet in octets {
        let v: u32 = octet.parse().map_err(|_| CidrError::InvalidSyntax(s.to_string()))?;
        if v > 255 {
            return Err(CidrError::InvalidSyntax(s.to_string()));
        }
        addr = (addr << 8) | v;
    }
    Ok(addr)
}

pub fn ip_to_string(addr: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (addr >> 24) & 0xff,
        (addr >> 16) & 0xff,
        (addr >> 8) & 0xff,
        addr & 0xff
    )
}

pub fn format_cidr(addr: u32, prefix_len: u8) -> String {
    format!("{}/{}", ip_to_string(addr), prefix_len)
}

/// `ceil(log2(k))`, with the two edge cases called out in the allocator's
/// source algorithm: `k = 0` has no defined bit width (caller must skip
/// allocation entirely), and `k = 1` is forced to 1 bit rather than 0 so a
/// degenerate single-host block still reserves a usable address.
pub fn bits_for_count(k: u64) -> u32 {
    if k == 0 {
        return 0;
    }
    if k == 1 {
        return 1;
    }
    let mut bits = 0u32;
    while (1u64 << bits) < k {
        bits += 1;
    }
    bits
}

/// Size a block within `parent_cidr` large enough for `needed_bits` of host
/// addressing, reusing the parent's network address. Fails if the parent's
/// declared prefix is too short to contain a block that size.
pub fn fit_block(parent_cidr: &str, needed_bits: u32) -> Result<(u32, u8), FitError> {
    let (network, given_prefix) =
        parse_cidr(parent_cidr).map_err(|e| FitError::Cidr(parent_cidr.to_string(), e))?;
    let needed_prefix = 32u32.saturating_sub(needed_bits);
    if needed_prefix < given_prefix as u32 {
        return Err(FitError::TooSmall {
            parent: parent_cidr.to_string(),
            needed_prefix: needed_prefix as u8,
            given_prefix,
        });
    }
    Ok((network, needed_prefix as u8))
}

#[derive(Debug, Error)]
pub enum FitError {
    #[error("{0}: {1}")]
    Cidr(String, CidrError),
    #[error("{parent} is too small: required block needs /{needed_prefix} but prefix is /{given_prefix}")]
    TooSmall {
        parent: String,
        needed_prefix: u8,
        given_prefix: u8,
    },
}

/// Usable host addresses of a block, ascending. For /31 and /32 there is no
/// reserved network/broadcast pair, so every address in the block is usable;
/// for wider blocks the first (network) and last (broadcast) are excluded.
pub fn usable_hosts(network: u32, prefix_len: u8) -> Vec<u32> {
    let host_bits = 32 - prefix_len as u32;
    let size: u64 = 1u64 << host_bits;
    let broadcast = network as u64 + size - 1;
    if prefix_len >= 31 {
        (network as u64..=broadcast).map(|a| a as u32).collect()
    } else {
        ((network as u64 + 1)..broadcast).map(|a| a as u32).collect()
    }
}

/// Enumerate the `child_prefix`-sized subnets that tile a parent block,
/// ascending by network address.
pub fn child_subnets(parent_network: u32, parent_prefix: u8, child_prefix: u8) -> Vec<(u32, u8)> {
    if child_prefix <= parent_prefix {
        return vec![(parent_network, parent_prefix)];
    }
    let host_bits = (child_prefix - parent_prefix) as u32;
    let count: u64 = 1u64 << host_bits;
    let step: u64 = 1u64 << (32 - child_prefix as u32);
    (0..count)
        .map(|i| ((parent_network as u64 + i * step) as u32, child_prefix))
        .collect()
}
