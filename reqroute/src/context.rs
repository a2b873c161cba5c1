// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use async_trait::async_trait;
use bytes::Bytes;
use reqroute_core::{Env, HttpSend, OsEnv, Result, Sleep};
use reqroute_http_send_reqwest::ReqwestHttpSend;
use reqroute_sleep_tokio::TokioSleep;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// DefaultContext sends requests with reqwest, reads the process env and sleeps on the
/// tokio timer.
///
/// Cloning is cheap, clones share the same client.
#[derive(Debug, Default, Clone)]
pub struct DefaultContext {
    http: Arc<ReqwestHttpSend>,
}

impl DefaultContext {
    /// Create a new `DefaultContext` with a default reqwest client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new `DefaultContext` sending requests with `client`.
    pub fn with_client(client: Client) -> Self {
        Self {
            http: Arc::new(ReqwestHttpSend::new(client)),
        }
    }
}

#[async_trait]
impl HttpSend for DefaultContext {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }
}

impl Env for DefaultContext {
    fn var(&self, key: &str) -> Option<String> {
        OsEnv.var(key)
    }
}

#[async_trait]
impl Sleep for DefaultContext {
    async fn sleep(&self, dur: Duration) {
        TokioSleep.sleep(dur).await
    }
}
