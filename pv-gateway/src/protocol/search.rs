/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Inbound search request model.

/// One requested channel name inside a search.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchItem {
    name: String,
    claimed: bool,
}

impl SearchItem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn claimed(&self) -> bool {
        self.claimed
    }

    pub fn claim(&mut self) {
        self.claimed = true;
    }
}

/// A search from one downstream host, listing names in request order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Search {
    source: String,
    items: Vec<SearchItem>,
}

impl Search {
    pub fn new<I, S>(source: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.to_string(),
            items: names
                .into_iter()
                .map(|name| SearchItem {
                    name: name.into(),
                    claimed: false,
                })
                .collect(),
        }
    }

    /// Address of the requesting host.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn items(&self) -> &[SearchItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut SearchItem> {
        self.items.iter_mut()
    }

    /// Names claimed so far, in request order.
    pub fn claimed_names(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.claimed)
            .map(SearchItem::name)
            .collect()
    }
}
