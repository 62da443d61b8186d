/*
 * client.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Feedfetch, a command-line feed reader.
 *
 * Feedfetch is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Feedfetch is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Feedfetch.  If not, see <http://www.gnu.org/licenses/>.
 */

//! HTTP client: one transport configuration, reused for sequential GETs.

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::http::exchange::fetch;
use crate::http::response::HttpResponse;
use crate::transport::{Transport, TransportConfig};

/// Sequential HTTP client. Each `get` opens and tears down its own connection.
pub struct HttpClient {
    transport: Transport,
}

impl HttpClient {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            transport: Transport::new(config),
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub async fn get(&mut self, endpoint: &Endpoint) -> Result<HttpResponse> {
        fetch(&mut self.transport, endpoint).await
    }
}
