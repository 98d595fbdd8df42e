#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use polycase_contract::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Contract)]
pub struct Person {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    #[contract(rename = "DateOfBirth", date_only)]
    pub dob: Option<NaiveDateTime>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Contract)]
pub struct Address {
    pub street_line: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Contract)]
pub struct Customer {
    pub customer_id: u64,
    pub home_address: Address,
    pub past_addresses: Vec<Address>,
    pub custom_tags: BTreeMap<String, u32>,
    #[contract(skip)]
    pub session_token: String,
}

#[derive(Contract)]
#[contract(ignore_cycles = true)]
pub struct Node {
    pub node_name: String,
    pub next_node: Option<Rc<RefCell<Node>>>,
}

#[derive(Contract)]
#[contract(ignore_cycles = false)]
pub struct StrictNode {
    pub node_name: String,
    pub next_node: Option<Rc<RefCell<StrictNode>>>,
}

#[derive(Contract)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<Rc<RefCell<Member>>>,
}

#[derive(Contract)]
#[contract(ignore_cycles = true)]
pub struct Member {
    pub member_name: String,
    pub team: Weak<RefCell<Team>>,
}

#[derive(Debug, Contract)]
pub struct Clashing {
    pub user_id: u32,
    #[contract(rename = "User_Id")]
    pub legacy_user_id: u32,
}

#[derive(Debug, Contract)]
pub struct Counter {
    #[contract(date_only)]
    pub hit_count: u32,
}

#[derive(Debug, Default, Contract)]
#[contract(skip_default = true, skip_null = true)]
pub struct Sparse {
    pub retry_count: u32,
    pub label: String,
    pub enabled: bool,
    pub comment: Option<String>,
}

pub fn resolver(policies: ContractPolicies) -> ContractResolver {
    ContractResolver::new(policies)
        .bind_selector(DynamicNamingSelector::new(Arc::new(ThreadScopedAccessor)))
        .bind_cache(Arc::new(MemoryContractCache::new()))
}

pub fn headers(convention: &str) -> RequestHeaders {
    RequestHeaders::from_iter([(NAMING_HEADER, convention)])
}

pub fn ada() -> Person {
    Person {
        id: 1,
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        dob: NaiveDate::from_ymd_opt(1815, 12, 10).and_then(|d| d.and_hms_opt(9, 30, 0)),
        email: None,
    }
}

pub fn customer() -> Customer {
    Customer {
        customer_id: 42,
        home_address: Address { street_line: "1 Main St".to_owned(), postal_code: "12345".to_owned() },
        past_addresses: vec![Address {
            street_line: "9 Old Rd".to_owned(),
            postal_code: "54321".to_owned(),
        }],
        custom_tags: BTreeMap::from([("VipLevel".to_owned(), 3)]),
        session_token: "secret".to_owned(),
    }
}
