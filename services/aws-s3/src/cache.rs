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

use crate::SigningContext;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// RegionCache remembers the signing context discovered for each bucket.
///
/// One cache is shared by all requests of a client. Entries are never evicted, growth is
/// bounded by the number of distinct buckets the client touches. Concurrent writers for the
/// same bucket race and the last one wins.
#[derive(Debug, Default)]
pub struct RegionCache {
    entries: Mutex<HashMap<String, SigningContext>>,
}

impl RegionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached signing context of `bucket`.
    pub fn get(&self, bucket: &str) -> Option<SigningContext> {
        self.lock().get(bucket).cloned()
    }

    /// Store the signing context of `bucket`, replacing any previous entry.
    pub fn put(&self, bucket: impl Into<String>, ctx: SigningContext) {
        self.lock().insert(bucket.into(), ctx);
    }

    /// Number of cached buckets.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SigningContext>> {
        // Entries are plain values, a panic while holding the lock leaves them usable.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
