//! Hickory DNS authority backed by a [`Zone`].

use async_trait::async_trait;
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{LowerName, RecordType};
use hickory_server::authority::{
    AuthLookup, Authority, LookupControlFlow, LookupError, LookupOptions, LookupRecords,
    MessageRequest, UpdateResult, ZoneType,
};
use hickory_server::server::RequestInfo;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::metrics::{self, QueryResult, Timer};
use crate::zone::{Answer, Zone};

/// Authority serving the records of one [`Zone`].
pub struct ZoneAuthority {
    zone: Arc<Zone>,
}

impl ZoneAuthority {
    /// Create a new authority over a shared zone.
    pub fn new(zone: Arc<Zone>) -> Self {
        Self { zone }
    }

    /// The zone this authority answers for.
    pub fn zone(&self) -> &Arc<Zone> {
        &self.zone
    }
}

fn into_lookup(answer: Answer, lookup_options: LookupOptions) -> LookupControlFlow<AuthLookup> {
    match answer {
        Answer::Records {
            answers,
            additionals,
        } => {
            let answers = LookupRecords::new(lookup_options, answers);
            let additionals =
                additionals.map(|additionals| LookupRecords::new(lookup_options, additionals));
            LookupControlFlow::Break(Ok(AuthLookup::answers(answers, additionals)))
        }
        // The catalog appends the zone SOA to the authority section for both.
        Answer::NoData { .. } => LookupControlFlow::Break(Err(LookupError::NameExists)),
        Answer::NxDomain { .. } => {
            LookupControlFlow::Break(Err(LookupError::ResponseCode(ResponseCode::NXDomain)))
        }
    }
}

#[async_trait]
impl Authority for ZoneAuthority {
    type Lookup = AuthLookup;

    fn zone_type(&self) -> ZoneType {
        ZoneType::Primary
    }

    fn is_axfr_allowed(&self) -> bool {
        false
    }

    fn origin(&self) -> &LowerName {
        self.zone.origin()
    }

    async fn lookup(
        &self,
        name: &LowerName,
        rtype: RecordType,
        lookup_options: LookupOptions,
    ) -> LookupControlFlow<Self::Lookup> {
        let timer = Timer::start();
        let rtype_str = format!("{:?}", rtype);

        trace!(name = %name, rtype = ?rtype, "DNS lookup");

        let answer = self.zone.resolve(name, rtype);
        let result = match &answer {
            Answer::Records { .. } => QueryResult::Success,
            Answer::NoData { .. } => QueryResult::NoData,
            Answer::NxDomain { .. } => QueryResult::NxDomain,
        };
        debug!(name = %name, rtype = ?rtype, result = ?result, "lookup answered");
        metrics::record_query(&rtype_str, result, timer.elapsed());

        into_lookup(answer, lookup_options)
    }

    async fn search(
        &self,
        request_info: RequestInfo<'_>,
        lookup_options: LookupOptions,
    ) -> LookupControlFlow<Self::Lookup> {
        self.lookup(
            request_info.query.name(),
            request_info.query.query_type(),
            lookup_options,
        )
        .await
    }

    async fn get_nsec_records(
        &self,
        _name: &LowerName,
        _lookup_options: LookupOptions,
    ) -> LookupControlFlow<Self::Lookup> {
        // DNSSEC not supported
        LookupControlFlow::Break(Err(LookupError::ResponseCode(ResponseCode::NoError)))
    }

    async fn update(&self, _update: &MessageRequest) -> UpdateResult<bool> {
        // Names are registered through the zone handle, not RFC 2136
        Err(ResponseCode::NotImp)
    }
}
