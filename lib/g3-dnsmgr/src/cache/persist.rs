/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::IpAddr;
use std::path::Path;

use anyhow::anyhow;

use super::DnsCache;
use crate::mapping::{ArcMapping, Mapping, MappingKind};

// one record per line:
// <created>\t<ttl>\t<kind>\t<failed>\t<key>\t<value1>[,<value2>...]
// extra fields after the values are ignored so newer writers stay readable

fn parse_line(line: &str, now: u64) -> anyhow::Result<Option<Mapping>> {
    let mut fields = line.split('\t');
    let created = fields
        .next()
        .ok_or_else(|| anyhow!("missing creation time"))?
        .parse::<u64>()
        .map_err(|e| anyhow!("invalid creation time: {e}"))?;
    let ttl = fields
        .next()
        .ok_or_else(|| anyhow!("missing ttl"))?
        .parse::<u32>()
        .map_err(|e| anyhow!("invalid ttl: {e}"))?;
    let kind = fields
        .next()
        .and_then(MappingKind::from_code)
        .ok_or_else(|| anyhow!("invalid mapping kind"))?;
    let failed = match fields.next() {
        Some("0") => false,
        Some("1") => true,
        _ => return Err(anyhow!("invalid failed flag")),
    };
    let key = fields.next().ok_or_else(|| anyhow!("missing key"))?;
    let values = fields.next().unwrap_or_default();
    let values: Vec<String> = if values.is_empty() {
        Vec::new()
    } else {
        values.split(',').map(|v| v.to_string()).collect()
    };

    // a zero ttl pins the entry, everything else expires by the clock
    if ttl > 0 && created.saturating_add(u64::from(ttl)) <= now {
        return Ok(None);
    }

    let mapping = match kind {
        MappingKind::Reverse => {
            let addr = key
                .parse::<IpAddr>()
                .map_err(|e| anyhow!("invalid address key: {e}"))?;
            Mapping::restored(kind, None, Some(addr), values, ttl, created, failed)
        }
        MappingKind::Forward | MappingKind::Text => {
            if key.is_empty() {
                return Err(anyhow!("empty name key"));
            }
            Mapping::restored(kind, Some(key.to_string()), None, values, ttl, created, failed)
        }
    };
    Ok(Some(mapping))
}

/// Load a cache file, skipping expired rows and logging malformed ones.
/// A missing file is not an error. Returns the number of restored entries.
pub(crate) fn load(cache: &mut DnsCache, path: &Path, now: u64) -> usize {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return 0,
    };
    let reader = BufReader::new(file);
    let mut restored = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::warn!("stopped reading {} at line {}: {e}", path.display(), i + 1);
                break;
            }
        };
        if line.is_empty() {
            continue;
        }
        match parse_line(&line, now) {
            Ok(Some(mapping)) => {
                cache.insert(mapping, false, now);
                restored += 1;
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("skipped line {} of {}: {e}", i + 1, path.display());
            }
        }
    }
    restored
}

fn write_mapping<W: Write>(out: &mut W, mapping: &ArcMapping) -> std::io::Result<()> {
    let key = match mapping.kind() {
        MappingKind::Reverse => mapping
            .key_addr()
            .map(|ip| ip.to_string())
            .unwrap_or_default(),
        MappingKind::Forward | MappingKind::Text => {
            mapping.key_host().unwrap_or_default().to_string()
        }
    };
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}",
        mapping.created(),
        mapping.ttl(),
        mapping.kind().code(),
        if mapping.failed() { '1' } else { '0' },
        key,
        mapping.persisted_values().join(",")
    )
}

/// Write all three tables to the cache file, one line per current mapping.
pub(crate) fn save(cache: &DnsCache, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .map_err(|e| anyhow!("failed to create cache file {}: {e}", path.display()))?;
    let mut out = BufWriter::new(file);
    for mapping in cache
        .iter_hosts()
        .chain(cache.iter_addrs())
        .chain(cache.iter_texts())
    {
        write_mapping(&mut out, mapping)
            .map_err(|e| anyhow!("failed to write cache file {}: {e}", path.display()))?;
    }
    out.flush()
        .map_err(|e| anyhow!("failed to flush cache file {}: {e}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DnsReply, ReplyPayload};
    use crate::query::{DnsQuery, RR_TYPE_A, RR_TYPE_TXT};
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("g3-dnsmgr-{}-{tag}.cache", std::process::id()));
        p
    }

    fn populated_cache(now: u64) -> DnsCache {
        let mut cache = DnsCache::new();
        let reply = DnsReply::answered(
            DnsQuery::forward("example.org", RR_TYPE_A),
            3600,
            ReplyPayload::Addrs(vec![
                "93.184.216.34".parse().unwrap(),
                "2001:db8::34".parse().unwrap(),
            ]),
        );
        cache.insert(Mapping::from_reply(&reply, now).unwrap(), false, now);
        let reply = DnsReply::answered(
            DnsQuery::reverse("93.184.216.34".parse().unwrap()),
            1800,
            ReplyPayload::Names(vec!["example.org".to_string()]),
        );
        cache.insert(Mapping::from_reply(&reply, now).unwrap(), false, now);
        let reply = DnsReply::answered(
            DnsQuery::forward("key.test", RR_TYPE_TXT),
            600,
            ReplyPayload::Texts(vec!["v=spf1 -all".to_string()]),
        );
        cache.insert(Mapping::from_reply(&reply, now).unwrap(), false, now);
        cache
    }

    #[test]
    fn round_trip() {
        let now = 1_700_000_000;
        let cache = populated_cache(now);
        let path = temp_path("round-trip");
        save(&cache, &path).unwrap();

        let mut loaded = DnsCache::new();
        let restored = load(&mut loaded, &path, now + 10);
        std::fs::remove_file(&path).ok();
        assert_eq!(restored, 3);

        let m = loaded.lookup_host("example.org", true, false, now + 10).unwrap();
        assert_eq!(m.addrs().len(), 2);
        assert_eq!(m.ttl(), 3600);
        assert_eq!(m.created(), now);
        let m = loaded
            .lookup_addr("93.184.216.34".parse().unwrap(), true, false, now + 10)
            .unwrap();
        assert_eq!(m.canonical_name(), Some("example.org"));
        let m = loaded.lookup_text("key.test", true, now + 10).unwrap();
        assert_eq!(m.texts(), ["v=spf1 -all".to_string()]);
    }

    #[test]
    fn expired_rows_are_dropped_on_load() {
        let now = 1_700_000_000;
        let cache = populated_cache(now);
        let path = temp_path("expired");
        save(&cache, &path).unwrap();

        let mut loaded = DnsCache::new();
        let restored = load(&mut loaded, &path, now + 10_000);
        std::fs::remove_file(&path).ok();
        assert_eq!(restored, 0);
    }

    #[test]
    fn zero_ttl_rows_are_always_restored() {
        let path = temp_path("pinned");
        std::fs::write(&path, "100\t0\tH\t0\tpinned.test\t10.0.0.1\n").unwrap();
        let mut loaded = DnsCache::new();
        let restored = load(&mut loaded, &path, 1_700_000_000);
        std::fs::remove_file(&path).ok();
        assert_eq!(restored, 1);
        assert!(loaded
            .lookup_host("pinned.test", true, false, 1_700_000_000)
            .is_some());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let path = temp_path("malformed");
        std::fs::write(
            &path,
            "not a record\n\
             100\t60\tX\t0\tbad.kind\t\n\
             1700000000\t0\tH\t0\tok.test\t10.0.0.1\n",
        )
        .unwrap();
        let mut loaded = DnsCache::new();
        let restored = load(&mut loaded, &path, 1_700_000_100);
        std::fs::remove_file(&path).ok();
        assert_eq!(restored, 1);
        assert_eq!(loaded.host_count(), 1);
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let path = temp_path("extra-fields");
        std::fs::write(
            &path,
            "1700000000\t0\tH\t0\tfuture.test\t10.0.0.1\tsome-new-field\n",
        )
        .unwrap();
        let mut loaded = DnsCache::new();
        let restored = load(&mut loaded, &path, 1_700_000_100);
        std::fs::remove_file(&path).ok();
        assert_eq!(restored, 1);
    }

    #[test]
    fn missing_file_is_empty() {
        let mut loaded = DnsCache::new();
        let restored = load(&mut loaded, Path::new("/nonexistent/g3-dnsmgr.cache"), 0);
        assert_eq!(restored, 0);
    }

    #[test]
    fn failed_rows_keep_the_flag() {
        let path = temp_path("failed-flag");
        std::fs::write(&path, "1700000000\t0\tH\t1\tgone.test\t\n").unwrap();
        let mut loaded = DnsCache::new();
        load(&mut loaded, &path, 1_700_000_100);
        std::fs::remove_file(&path).ok();
        assert!(loaded
            .lookup_host("gone.test", false, false, 1_700_000_100)
            .is_none());
        let m = loaded
            .lookup_host("gone.test", false, true, 1_700_000_100)
            .unwrap();
        assert!(m.failed());
    }
}
