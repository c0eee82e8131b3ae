//! The zone resolver.
//!
//! A [`Zone`] owns the facts of one authoritative zone (apex, nameserver,
//! answer address, SOA timers), the live [`SubdomainSet`] and a
//! [`RecordCache`]. It is built once at startup and shared by handle between
//! the DNS listener and whatever registers users.
//!
//! ```text
//! NS   <apex>        -> NS <nameserver>, additional: A <nameserver_addr>
//! SOA  <apex>        -> SOA
//! A    <registered>  -> A <answer_addr>
//! *    <registered>  -> NOERROR, no answers (SOA in authority)
//! *    <unknown>     -> NXDOMAIN (SOA in authority)
//! ```

use hickory_proto::op::ResponseCode;
use hickory_proto::rr::rdata::{A, NS, SOA};
use hickory_proto::rr::{DNSClass, LowerName, Name, RData, Record, RecordSet, RecordType};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{RecordCache, RecordKey};
use crate::config::{DnsConfig, SoaConfig};
use crate::defaults::{self, normalize, qualify};
use crate::error::DnsError;
use crate::metrics;
use crate::state::SubdomainSet;

/// Result of resolving one question against the zone.
#[derive(Debug, Clone)]
pub enum Answer {
    /// Positive answer, optionally with additional-section records.
    Records {
        /// Answer section.
        answers: Arc<RecordSet>,
        /// Additional section (glue).
        additionals: Option<Arc<RecordSet>>,
    },
    /// The name exists but has no records of the requested type.
    NoData {
        /// SOA for the authority section.
        soa: Arc<RecordSet>,
    },
    /// The name does not exist in the zone.
    NxDomain {
        /// SOA for the authority section.
        soa: Arc<RecordSet>,
    },
}

impl Answer {
    /// Response code a server should send for this answer.
    pub fn response_code(&self) -> ResponseCode {
        match self {
            Answer::Records { .. } | Answer::NoData { .. } => ResponseCode::NoError,
            Answer::NxDomain { .. } => ResponseCode::NXDomain,
        }
    }

    /// Answer section records, empty for negative answers.
    pub fn answers(&self) -> Vec<Record> {
        match self {
            Answer::Records { answers, .. } => answers.records_without_rrsigs().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Additional section records.
    pub fn additionals(&self) -> Vec<Record> {
        match self {
            Answer::Records {
                additionals: Some(additionals),
                ..
            } => additionals.records_without_rrsigs().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Authority section records (the SOA on negative answers).
    pub fn authority(&self) -> Vec<Record> {
        match self {
            Answer::NoData { soa } | Answer::NxDomain { soa } => {
                soa.records_without_rrsigs().cloned().collect()
            }
            Answer::Records { .. } => Vec::new(),
        }
    }
}

/// Validated, immutable facts about the zone.
#[derive(Debug, Clone)]
struct ZoneFacts {
    apex: LowerName,
    nameserver: Name,
    nameserver_addr: Ipv4Addr,
    answer_addr: Ipv4Addr,
    ttl: u32,
    rname: Name,
    soa: SoaConfig,
}

fn parse_name(name: &str) -> Result<Name, DnsError> {
    Name::from_ascii(normalize(name)).map_err(|e| DnsError::InvalidName {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

impl ZoneFacts {
    fn from_config(config: &DnsConfig) -> Result<Self, DnsError> {
        let apex = parse_name(&config.zone)?;
        let nameserver = parse_name(&config.nameserver)?;
        let rname = match &config.soa.rname {
            Some(rname) => parse_name(rname)?,
            None => parse_name(&qualify("hostmaster", &config.zone))?,
        };

        if !apex.zone_of(&nameserver) {
            return Err(DnsError::Config(format!(
                "nameserver {nameserver} is outside zone {apex}"
            )));
        }

        Ok(Self {
            apex: apex.into(),
            nameserver,
            nameserver_addr: config.nameserver_addr,
            answer_addr: config.answer_addr(),
            ttl: config.ttl,
            rname,
            soa: config.soa.clone(),
        })
    }
}

fn single_record_set(name: Name, ttl: u32, rdata: RData, serial: u32) -> RecordSet {
    let mut record_set = RecordSet::new(name.clone(), rdata.record_type(), serial);
    let mut record = Record::from_rdata(name, ttl, rdata);
    record.set_dns_class(DNSClass::IN);
    record_set.insert(record, serial);
    record_set
}

/// Authoritative resolver for one zone with a runtime-extensible name set.
#[derive(Debug)]
pub struct Zone {
    facts: ZoneFacts,
    names: SubdomainSet,
    cache: RecordCache,
}

impl Zone {
    /// Build a zone from configuration, seeded with the default name list.
    pub fn new(config: &DnsConfig) -> Result<Self, DnsError> {
        let names = defaults::default_names(
            &config.zone,
            &config.nameserver,
            config.default_labels.as_deref(),
        );
        Self::with_names(config, names)
    }

    /// Build a zone whose default name list is exactly `names`.
    pub fn with_names<I, S>(config: &DnsConfig, names: I) -> Result<Self, DnsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let facts = ZoneFacts::from_config(config)?;
        let names = SubdomainSet::new(names);

        info!(
            zone = %facts.apex,
            nameserver = %facts.nameserver,
            default_names = names.defaults_len(),
            "zone loaded"
        );

        Ok(Self {
            facts,
            names,
            cache: RecordCache::new(),
        })
    }

    /// The zone apex.
    pub fn origin(&self) -> &LowerName {
        &self.facts.apex
    }

    /// Answer a question for `name` and `rtype`.
    pub fn resolve(&self, name: &LowerName, rtype: RecordType) -> Answer {
        let at_apex = *name == self.facts.apex;

        if at_apex {
            match rtype {
                RecordType::NS => {
                    return Answer::Records {
                        answers: self.ns(),
                        additionals: Some(self.glue()),
                    }
                }
                RecordType::SOA => {
                    return Answer::Records {
                        answers: self.soa(),
                        additionals: None,
                    }
                }
                _ => {}
            }
        }

        // Keyed by the wire form; `Display` would decode punycode labels.
        // The read lock is released before any record is built.
        let exists = self.names.contains(&Name::from(name.clone()).to_ascii());

        match (exists || at_apex, rtype) {
            (true, RecordType::A) if exists => Answer::Records {
                answers: self.subdomain_a(name),
                additionals: None,
            },
            (true, _) => Answer::NoData { soa: self.soa() },
            (false, _) => Answer::NxDomain { soa: self.soa() },
        }
    }

    /// Make `name` resolvable. Registering a name twice is harmless.
    pub fn register(&self, name: &str) {
        self.names.insert(name);
        metrics::record_register();
    }

    /// Register `label` as a direct child of the apex.
    pub fn register_label(&self, label: &str) {
        self.register(&qualify(label, &self.apex_name().to_ascii()));
    }

    /// Forget every registered name, restoring the default list.
    pub fn reset(&self) {
        self.names.reset_with(|| self.cache.clear());
        metrics::record_reset();
        info!(names = self.names.len(), "zone reset to defaults");
    }

    /// Whether `name` is currently resolvable.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of names currently resolvable.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no names are resolvable.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of record sets currently cached.
    pub fn cached_records(&self) -> usize {
        self.cache.len()
    }

    /// Emit gauges for the name set and record cache.
    pub fn emit_metrics(&self) {
        self.names.emit_metrics();
        metrics::record_cache_entries(self.cache.len());
    }

    /// The zone SOA record.
    pub fn soa(&self) -> Arc<RecordSet> {
        self.cache.get_or_build(RecordKey::ApexSoa, || {
            let soa = &self.facts.soa;
            let rdata = SOA::new(
                self.facts.nameserver.clone(),
                self.facts.rname.clone(),
                soa.serial,
                soa.refresh as i32,
                soa.retry as i32,
                soa.expire as i32,
                soa.minimum,
            );
            single_record_set(self.apex_name(), soa.ttl, RData::SOA(rdata), soa.serial)
        })
    }

    fn ns(&self) -> Arc<RecordSet> {
        self.cache.get_or_build(RecordKey::ApexNs, || {
            let rdata = RData::NS(NS(self.facts.nameserver.clone()));
            single_record_set(self.apex_name(), self.facts.ttl, rdata, self.facts.soa.serial)
        })
    }

    fn glue(&self) -> Arc<RecordSet> {
        self.cache.get_or_build(RecordKey::ApexGlue, || {
            let rdata = RData::A(A::from(self.facts.nameserver_addr));
            single_record_set(
                self.facts.nameserver.clone(),
                self.facts.ttl,
                rdata,
                self.facts.soa.serial,
            )
        })
    }

    fn subdomain_a(&self, name: &LowerName) -> Arc<RecordSet> {
        self.cache
            .get_or_build(RecordKey::Subdomain(name.clone()), || {
                debug!(name = %name, "building A record");
                let rdata = RData::A(A::from(self.facts.answer_addr));
                single_record_set(
                    Name::from(name.clone()),
                    self.facts.ttl,
                    rdata,
                    self.facts.soa.serial,
                )
            })
    }

    fn apex_name(&self) -> Name {
        Name::from(self.facts.apex.clone())
    }
}

/// The operations the account layer uses to keep the zone in step with
/// user signups and benchmark re-initialization.
pub trait SubdomainRegistry: Send + Sync {
    /// Make a fully-qualified name resolvable.
    fn register(&self, name: &str);

    /// Make `<label>.<apex>` resolvable.
    fn register_label(&self, label: &str);

    /// Drop every registered name, keeping only the defaults.
    fn reset(&self);
}

impl SubdomainRegistry for Zone {
    fn register(&self, name: &str) {
        Zone::register(self, name)
    }

    fn register_label(&self, label: &str) {
        Zone::register_label(self, label)
    }

    fn reset(&self) {
        Zone::reset(self)
    }
}

impl<T: SubdomainRegistry + ?Sized> SubdomainRegistry for Arc<T> {
    fn register(&self, name: &str) {
        (**self).register(name)
    }

    fn register_label(&self, label: &str) {
        (**self).register_label(label)
    }

    fn reset(&self) {
        (**self).reset()
    }
}
