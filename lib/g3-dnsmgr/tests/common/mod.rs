/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;

use g3_dnsmgr::{
    AddrSet, DnsEvent, DnsQuery, DnsReply, EventSink, LookupCallback, LookupChannelError,
    ReplyPayload, ReplySender, ResolverChannel, SocketEvent,
};

/// How the mock channel answers one (key, rr_type) pair.
#[derive(Clone)]
pub enum MockAnswer {
    Addrs(Vec<&'static str>, u32),
    Names(Vec<&'static str>, u32),
    Texts(Vec<&'static str>, u32),
    NoSuchRecord(u32),
    ChannelError,
    /// accept the query but never answer it
    Hold,
    /// refuse the query at submit time
    Reject,
}

struct MockState {
    plan: HashMap<(String, u16), MockAnswer>,
    submitted: Vec<DnsQuery>,
    inbox: Vec<(DnsQuery, ReplySender)>,
    socket_events: Vec<SocketEvent>,
}

/// Control handle for a scripted resolver channel. The handle stays with
/// the test while the channel itself moves into the manager.
#[derive(Clone)]
pub struct MockControl {
    state: Rc<RefCell<MockState>>,
}

impl MockControl {
    pub fn new() -> Self {
        MockControl {
            state: Rc::new(RefCell::new(MockState {
                plan: HashMap::new(),
                submitted: Vec::new(),
                inbox: Vec::new(),
                socket_events: Vec::new(),
            })),
        }
    }

    pub fn channel(&self) -> Box<dyn ResolverChannel> {
        Box::new(MockChannel {
            state: self.state.clone(),
        })
    }

    pub fn answer(&self, key: &str, rr_type: u16, answer: MockAnswer) {
        self.state
            .borrow_mut()
            .plan
            .insert((key.to_string(), rr_type), answer);
    }

    pub fn submitted_count(&self) -> usize {
        self.state.borrow().submitted.len()
    }

    pub fn submitted(&self) -> Vec<DnsQuery> {
        self.state.borrow().submitted.clone()
    }

    pub fn push_socket_event(&self, fd: i32, active: bool) {
        self.state
            .borrow_mut()
            .socket_events
            .push(SocketEvent { fd, active });
    }
}

struct MockChannel {
    state: Rc<RefCell<MockState>>,
}

fn build_reply(query: DnsQuery, answer: &MockAnswer) -> DnsReply {
    match answer {
        MockAnswer::Addrs(addrs, ttl) => {
            let addrs: Vec<IpAddr> = addrs.iter().map(|s| s.parse().unwrap()).collect();
            DnsReply::answered(query, *ttl, ReplyPayload::Addrs(addrs))
        }
        MockAnswer::Names(names, ttl) => {
            let names = names.iter().map(|s| s.to_string()).collect();
            DnsReply::answered(query, *ttl, ReplyPayload::Names(names))
        }
        MockAnswer::Texts(texts, ttl) => {
            let texts = texts.iter().map(|s| s.to_string()).collect();
            DnsReply::answered(query, *ttl, ReplyPayload::Texts(texts))
        }
        MockAnswer::NoSuchRecord(ttl) => DnsReply::no_such_record(query, *ttl),
        MockAnswer::ChannelError => DnsReply::channel_error(query),
        MockAnswer::Hold | MockAnswer::Reject => unreachable!(),
    }
}

impl ResolverChannel for MockChannel {
    fn submit(
        &mut self,
        query: DnsQuery,
        replies: &ReplySender,
    ) -> Result<(), LookupChannelError> {
        let mut state = self.state.borrow_mut();
        state.submitted.push(query.clone());
        let plan_key = (query.key.to_string(), query.rr_type);
        if matches!(state.plan.get(&plan_key), Some(MockAnswer::Reject)) {
            return Err(LookupChannelError::Rejected);
        }
        state.inbox.push((query, replies.clone()));
        Ok(())
    }

    fn process(&mut self) {
        let mut state = self.state.borrow_mut();
        let inbox = std::mem::take(&mut state.inbox);
        for (query, tx) in inbox {
            let plan_key = (query.key.to_string(), query.rr_type);
            let answer = match state.plan.get(&plan_key) {
                Some(MockAnswer::Hold) | None => None,
                Some(answer) => Some(answer.clone()),
            };
            match answer {
                Some(answer) => {
                    let _ = tx.send(build_reply(query, &answer));
                }
                None => state.inbox.push((query, tx)),
            }
        }
    }

    fn wait_and_process(&mut self, timeout: Duration) {
        self.process();
        // stay polite in the busy-wait loops of blocking lookups
        std::thread::sleep(timeout.min(Duration::from_millis(1)));
    }

    fn next_timeout(&self) -> Option<Duration> {
        None
    }

    fn poll_socket_events(&mut self) -> Vec<SocketEvent> {
        std::mem::take(&mut self.state.borrow_mut().socket_events)
    }
}

/// One notification received by a recording callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notified {
    Addrs(usize, Vec<IpAddr>),
    Name(usize, String),
    Values(usize, Vec<String>, u16),
    Timeout(usize),
}

/// Shared log of callback notifications, in delivery order.
#[derive(Clone)]
pub struct CallbackLog {
    log: Rc<RefCell<Vec<Notified>>>,
}

impl CallbackLog {
    pub fn new() -> Self {
        CallbackLog {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn callback(&self, id: usize) -> Box<dyn LookupCallback> {
        Box::new(Recorder {
            id,
            log: self.log.clone(),
        })
    }

    pub fn entries(&self) -> Vec<Notified> {
        self.log.borrow().clone()
    }
}

struct Recorder {
    id: usize,
    log: Rc<RefCell<Vec<Notified>>>,
}

impl LookupCallback for Recorder {
    fn resolved_name(&mut self, name: &str) {
        self.log
            .borrow_mut()
            .push(Notified::Name(self.id, name.to_string()));
    }

    fn resolved_addrs(&mut self, addrs: &AddrSet) {
        self.log
            .borrow_mut()
            .push(Notified::Addrs(self.id, addrs.iter().copied().collect()));
    }

    fn resolved_value(&mut self, values: &[String], rr_type: u16) {
        self.log
            .borrow_mut()
            .push(Notified::Values(self.id, values.to_vec(), rr_type));
    }

    fn timed_out(&mut self) {
        self.log.borrow_mut().push(Notified::Timeout(self.id));
    }
}

/// Shared log of emitted host runtime events.
#[derive(Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<DnsEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog {
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn sink(&self) -> Box<dyn EventSink> {
        Box::new(Collector {
            events: self.events.clone(),
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|e| e.name()).collect()
    }

    pub fn events(&self) -> Vec<DnsEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

struct Collector {
    events: Rc<RefCell<Vec<DnsEvent>>>,
}

impl EventSink for Collector {
    fn dispatch(&mut self, event: DnsEvent) {
        self.events.borrow_mut().push(event);
    }
}
