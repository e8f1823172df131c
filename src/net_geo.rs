//! Network connection geolocation feed
//!
//! Parses /proc/net/tcp and /proc/net/udp to get active connections,
//! then uses MaxMind GeoLite2 database to map remote IPs to coordinates.
//! Every connection seen for the first time becomes a hit.

use crate::feed::HitFeed;
use crate::hit::Hit;
use maxminddb::{geoip2, Reader};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Site ids for connection hits
pub const SITE_TCP_OUT: &str = "tcp-out";
pub const SITE_TCP_IN: &str = "tcp-in";
pub const SITE_UDP: &str = "udp";

/// First port of the Linux ephemeral range; local ports above it are ours
const EPHEMERAL_PORT_START: u16 = 32768;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Protocol {
    Tcp,
    Udp,
}

/// One remote endpoint parsed from a /proc/net table row
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProcEntry {
    pub remote_ip: Ipv4Addr,
    pub remote_port: u16,
    pub local_port: u16,
    pub protocol: Protocol,
}

impl ProcEntry {
    pub fn site_id(&self) -> &'static str {
        match self.protocol {
            Protocol::Udp => SITE_UDP,
            Protocol::Tcp if self.local_port >= EPHEMERAL_PORT_START => SITE_TCP_OUT,
            Protocol::Tcp => SITE_TCP_IN,
        }
    }
}

/// Parse one row of /proc/net/{tcp,udp}.
///
/// Rows without a public remote peer, and TCP listeners, yield `None`.
pub fn parse_proc_line(line: &str, protocol: Protocol) -> Option<ProcEntry> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }

    let (rem_ip_hex, rem_port_hex) = parts[2].split_once(':')?;
    if rem_ip_hex == "00000000" {
        return None;
    }
    let remote_ip = parse_hex_ip(rem_ip_hex)?;
    if is_local_or_private(remote_ip) {
        return None;
    }

    // 0A = LISTEN
    if protocol == Protocol::Tcp && parts[3].eq_ignore_ascii_case("0A") {
        return None;
    }

    let local_port = parts[1]
        .split_once(':')
        .and_then(|(_, p)| u16::from_str_radix(p, 16).ok())
        .unwrap_or(0);

    Some(ProcEntry {
        remote_ip,
        remote_port: u16::from_str_radix(rem_port_hex, 16).unwrap_or(0),
        local_port,
        protocol,
    })
}

/// Cache for IP -> location lookups to avoid repeated database queries
struct IpCache {
    cache: HashMap<Ipv4Addr, Option<(f64, f64)>>,
    max_size: usize,
}

impl IpCache {
    fn new(max_size: usize) -> Self {
        Self {
            cache: HashMap::with_capacity(max_size),
            max_size,
        }
    }

    fn get_or_insert<F>(&mut self, ip: Ipv4Addr, lookup_fn: F) -> Option<(f64, f64)>
    where
        F: FnOnce(Ipv4Addr) -> Option<(f64, f64)>,
    {
        if let Some(&cached) = self.cache.get(&ip) {
            return cached;
        }

        // Evict half the cache if at capacity
        if self.cache.len() >= self.max_size {
            let to_remove: Vec<_> = self.cache.keys().take(self.max_size / 2).cloned().collect();
            for key in to_remove {
                self.cache.remove(&key);
            }
        }

        let result = lookup_fn(ip);
        self.cache.insert(ip, result);
        result
    }
}

/// MaxMind GeoLite2 database reader
struct GeoIpLookup {
    reader: Option<Reader<Vec<u8>>>,
}

impl GeoIpLookup {
    fn new(db_path: Option<&Path>) -> Self {
        let reader = Self::find_database(db_path).and_then(|path| {
            match Reader::open_readfile(&path) {
                Ok(reader) => {
                    tracing::info!(path = %path.display(), "GeoIP database loaded");
                    Some(reader)
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "GeoIP database unreadable");
                    None
                }
            }
        });

        Self { reader }
    }

    fn find_database(explicit_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit_path {
            if path.exists() {
                return Some(path.to_path_buf());
            }
        }

        let candidates = [
            dirs::config_dir().map(|p| p.join("airtraffic/GeoLite2-City.mmdb")),
            Some(PathBuf::from("/usr/share/GeoIP/GeoLite2-City.mmdb")),
            Some(PathBuf::from("/var/lib/GeoIP/GeoLite2-City.mmdb")),
            Some(PathBuf::from("./GeoLite2-City.mmdb")),
        ];

        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// (lat, lon) in degrees
    fn lookup(&self, ip: IpAddr) -> Option<(f64, f64)> {
        let reader = self.reader.as_ref()?;
        let city: geoip2::City = reader.lookup(ip).ok()?;
        let location = city.location?;
        Some((location.latitude?, location.longitude?))
    }

    fn is_available(&self) -> bool {
        self.reader.is_some()
    }
}

type ConnKey = (Ipv4Addr, u16, Protocol);

/// Emits a hit for every newly observed remote connection
pub struct ConnectionFeed {
    known: HashSet<ConnKey>,
    ip_cache: IpCache,
    geo_lookup: GeoIpLookup,
    last_update: Option<Instant>,
    update_interval: Duration,
}

impl ConnectionFeed {
    pub fn new(geoip_db: Option<&Path>) -> Self {
        Self {
            known: HashSet::new(),
            ip_cache: IpCache::new(1024),
            geo_lookup: GeoIpLookup::new(geoip_db),
            last_update: None,
            update_interval: Duration::from_secs(1),
        }
    }

    /// Returns true if GeoIP database is loaded
    pub fn has_database(&self) -> bool {
        self.geo_lookup.is_available()
    }

    fn scan(&mut self, now_ms: i64) -> io::Result<Vec<Hit>> {
        let mut seen = HashSet::new();
        let mut hits = Vec::new();

        for (path, protocol) in [("/proc/net/tcp", Protocol::Tcp), ("/proc/net/udp", Protocol::Udp)] {
            let content = fs::read_to_string(path)?;
            for entry in content.lines().skip(1).filter_map(|l| parse_proc_line(l, protocol)) {
                let key = (entry.remote_ip, entry.remote_port, entry.protocol);
                seen.insert(key);
                if self.known.contains(&key) {
                    continue;
                }

                let geo = &self.geo_lookup;
                let location = self
                    .ip_cache
                    .get_or_insert(entry.remote_ip, |ip| geo.lookup(IpAddr::V4(ip)));
                if let Some((lat, lon)) = location {
                    hits.push(Hit::new(entry.site_id(), lat, lon, now_ms));
                }
            }
        }

        // Connections that went away can produce a hit again later
        self.known = seen;
        Ok(hits)
    }
}

impl HitFeed for ConnectionFeed {
    fn poll(&mut self, now_ms: i64) -> Vec<Hit> {
        let now = Instant::now();
        if self
            .last_update
            .is_some_and(|last| now.duration_since(last) < self.update_interval)
        {
            return Vec::new();
        }
        self.last_update = Some(now);

        match self.scan(now_ms) {
            Ok(hits) => {
                if !hits.is_empty() {
                    tracing::debug!(count = hits.len(), "new connections");
                }
                hits
            }
            Err(err) => {
                tracing::warn!(error = %err, "reading /proc/net failed");
                Vec::new()
            }
        }
    }
}

/// Parse hex IP from /proc/net format (little-endian)
fn parse_hex_ip(hex: &str) -> Option<Ipv4Addr> {
    let bytes = u32::from_str_radix(hex, 16).ok()?;
    Some(Ipv4Addr::from(bytes.swap_bytes()))
}

/// Check if IP is localhost, private, link-local or unspecified
fn is_local_or_private(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 93.184.216.34:443 from local 192.168.1.10:51000, ESTABLISHED
    const TCP_OUT: &str =
        "   0: 0A01A8C0:C738 22D8B85D:01BB 01 00000000:00000000 00:00000000 00000000  1000";

    #[test]
    fn hex_ip_is_little_endian() {
        assert_eq!(parse_hex_ip("0100007F"), Some(Ipv4Addr::new(127, 0, 0, 1)));
        assert_eq!(parse_hex_ip("22D8B85D"), Some(Ipv4Addr::new(93, 184, 216, 34)));
        assert_eq!(parse_hex_ip("zz"), None);
    }

    #[test]
    fn private_ranges_are_local() {
        assert!(is_local_or_private(Ipv4Addr::new(10, 1, 2, 3)));
        assert!(is_local_or_private(Ipv4Addr::new(172, 20, 0, 1)));
        assert!(is_local_or_private(Ipv4Addr::new(192, 168, 0, 1)));
        assert!(is_local_or_private(Ipv4Addr::new(127, 0, 0, 1)));
        assert!(!is_local_or_private(Ipv4Addr::new(8, 8, 8, 8)));
    }

    #[test]
    fn parses_outbound_tcp_row() {
        let entry = parse_proc_line(TCP_OUT, Protocol::Tcp).unwrap();
        assert_eq!(entry.remote_ip, Ipv4Addr::new(93, 184, 216, 34));
        assert_eq!(entry.remote_port, 443);
        assert_eq!(entry.local_port, 51000);
        assert_eq!(entry.site_id(), SITE_TCP_OUT);
    }

    #[test]
    fn skips_listeners_and_private_peers() {
        let listen = TCP_OUT.replace(" 01 ", " 0A ");
        assert_eq!(parse_proc_line(&listen, Protocol::Tcp), None);
        let private = TCP_OUT.replace("22D8B85D", "0101A8C0");
        assert_eq!(parse_proc_line(&private, Protocol::Tcp), None);
        assert_eq!(parse_proc_line("garbage", Protocol::Tcp), None);
    }

    #[test]
    fn inbound_and_udp_sites() {
        let inbound = TCP_OUT.replace("0A01A8C0:C738", "0A01A8C0:0016");
        assert_eq!(parse_proc_line(&inbound, Protocol::Tcp).unwrap().site_id(), SITE_TCP_IN);
        assert_eq!(parse_proc_line(TCP_OUT, Protocol::Udp).unwrap().site_id(), SITE_UDP);
    }

    #[test]
    fn ip_cache_remembers_misses() {
        let mut cache = IpCache::new(4);
        let ip = Ipv4Addr::new(8, 8, 8, 8);
        assert_eq!(cache.get_or_insert(ip, |_| None), None);
        assert_eq!(cache.get_or_insert(ip, |_| Some((1.0, 2.0))), None);
    }

    #[test]
    fn ip_cache_evicts_at_capacity() {
        let mut cache = IpCache::new(2);
        for i in 0..5 {
            cache.get_or_insert(Ipv4Addr::new(8, 8, 8, i), |_| Some((0.0, 0.0)));
        }
        assert!(cache.cache.len() <= 2);
    }
}
