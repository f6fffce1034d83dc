//! テスト用のモックRPCチャネル

#![allow(dead_code)]

use async_trait::async_trait;
use edgar_desk::error::Result;
use edgar_desk::rpc::{BackendClient, RpcChannel};
use serde_json::Value;
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&str, &[Value]) -> Result<Value> + Send + Sync>;

/// 呼び出しを記録し、クロージャで応答を返すチャネル
pub struct MockChannel {
    responder: Responder,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockChannel {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    /// 指定メソッドの呼び出し回数
    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == method)
            .count()
    }
}

#[async_trait]
impl RpcChannel for MockChannel {
    async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), args.clone()));
        (self.responder)(name, &args)
    }
}

pub fn client(channel: &Arc<MockChannel>) -> BackendClient {
    BackendClient::new(channel.clone())
}

/// search_form_info の応答例（1社・10-K 2件）
pub fn sample_form_data(cik: &str, name: &str) -> Value {
    serde_json::json!({
        "cik": cik,
        "issuing_entity": name,
        "state_of_incorporation": "CA",
        "ein": "942404110",
        "forms": ["10-K"],
        "address": {
            "mailing": {
                "street1": "ONE APPLE PARK WAY",
                "city": "CUPERTINO",
                "stateOrCountry": "CA",
                "zipCode": "95014"
            },
            "business": {
                "street1": "ONE APPLE PARK WAY",
                "city": "CUPERTINO",
                "stateOrCountry": "CA",
                "zipCode": "95014"
            }
        },
        "filings": [
            {
                "reportDate": "2023-09-30",
                "filingDate": "2023-11-03",
                "document": format!("https://www.sec.gov/Archives/edgar/data/{}/a-2023.htm", cik),
                "form": "10-K",
                "isXBRL": true,
                "isInlineXBRL": true
            },
            {
                "reportDate": "2022-09-24",
                "filingDate": "2022-10-28",
                "document": format!("https://www.sec.gov/Archives/edgar/data/{}/a-2022.htm", cik),
                "form": "10-K",
                "isXBRL": true,
                "isInlineXBRL": true
            }
        ]
    })
}
