//! The portal's name-search form.
//!
//! Selectors are tied to the portal's markup: value-keyed buttons and radio
//! controls, name-keyed text inputs. Every control is waited on (bounded)
//! before it is touched; a control that never appears fails the whole query,
//! which the orchestrator logs and skips.

use anyhow::Result;

use crate::core::types::{CustodyStatus, Gender, SearchQuery};
use crate::scraping::session::PortalSession;

const SEARCH_BY_NAME_BTN: &str = "input[value='Search by Name']";
const LAST_NAME_INPUT: &str = "input[name='txtLName']";
const FIRST_INITIAL_INPUT: &str = "input[name='txtFName']";
const SEARCH_BTN: &str = "input[value='Search']";

fn gender_selector(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "input[value='Male']",
        Gender::Female => "input[value='Female']",
    }
}

fn status_selector(status: CustodyStatus) -> &'static str {
    match status {
        CustodyStatus::Active => "input[value='Active']",
        CustodyStatus::Inactive => "input[value='Inactive']",
    }
}

/// Fill and submit the search form from the landing page. On return the
/// portal is loading the result grid (or an empty result notice).
pub async fn submit_search(
    session: &PortalSession,
    base_url: &str,
    query: &SearchQuery,
) -> Result<()> {
    session.goto(base_url).await?;

    session.click(SEARCH_BY_NAME_BTN).await?;
    session
        .clear_and_type(LAST_NAME_INPUT, &query.last_name)
        .await?;
    session
        .clear_and_type(FIRST_INITIAL_INPUT, &query.first_initial)
        .await?;

    session.click(gender_selector(query.gender)).await?;
    session.click(status_selector(query.status)).await?;

    session.click(SEARCH_BTN).await?;
    Ok(())
}
