//! GitHub GraphQL implementation of [`EventSource`].

use super::{EventSource, RemoteEvent, RosterMember};
use crate::core::clock;
use crate::errors::{AppError, AppResult};
use crate::utils::date::DateRange;
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const PAGE_SIZE: u32 = 100;

const TEAM_MEMBERS_QUERY: &str = r#"
query($org: String!, $team: String!, $cursor: String) {
    organization(login: $org) {
        team(slug: $team) {
            members(first: 100, after: $cursor) {
                pageInfo { hasNextPage endCursor }
                nodes { login name email }
            }
        }
    }
}
"#;

const USER_PULL_REQUESTS_QUERY: &str = r#"
query($username: String!, $cursor: String) {
    user(login: $username) {
        pullRequests(first: 100, after: $cursor, orderBy: {field: CREATED_AT, direction: DESC}) {
            pageInfo { hasNextPage endCursor }
            nodes {
                id
                title
                createdAt
                repository { nameWithOwner }
            }
        }
    }
}
"#;

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<N> {
    page_info: PageInfo,
    nodes: Vec<N>,
}

#[derive(Deserialize)]
struct TeamData {
    organization: Option<OrganizationNode>,
}

#[derive(Deserialize)]
struct OrganizationNode {
    team: Option<TeamNode>,
}

#[derive(Deserialize)]
struct TeamNode {
    members: Page<MemberNode>,
}

#[derive(Deserialize)]
struct MemberNode {
    login: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Deserialize)]
struct UserData {
    user: Option<UserNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserNode {
    pull_requests: Page<PullRequestNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    id: String,
    title: String,
    created_at: String,
    repository: RepositoryNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name_with_owner: String,
}

/// Blank strings from the API (private emails, unset names) become `None`.
fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub struct GitHubClient {
    http: Client,
    endpoint: String,
    organization: String,
    team: String,
}

impl GitHubClient {
    pub fn new(token: &str, api_url: &str, organization: &str, team: &str) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| AppError::Config("GITHUB_TOKEN contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("prmonitor/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/graphql", api_url.trim_end_matches('/')),
            organization: organization.to_string(),
            team: team.to_string(),
        })
    }

    fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> AppResult<T> {
        let payload = json!({ "query": query, "variables": variables });

        let response = self.http.post(&self.endpoint).json(&payload).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AppError::SourceUnavailable(format!(
                "GitHub API error: {status} - {body}"
            )));
        }

        let parsed: GraphQlResponse<T> = response.json()?;
        parsed.into_data()
    }
}

impl<T> GraphQlResponse<T> {
    /// Any GraphQL error, or a missing `data`, makes the source unavailable.
    fn into_data(self) -> AppResult<T> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(AppError::SourceUnavailable(format!(
                "GraphQL errors: {}",
                messages.join("; ")
            )));
        }

        self.data
            .ok_or_else(|| AppError::SourceUnavailable("GraphQL response without data".into()))
    }
}

impl PageInfo {
    fn next_cursor(self) -> Option<String> {
        match (self.has_next_page, self.end_cursor) {
            (true, Some(next)) => Some(next),
            _ => None,
        }
    }
}

/// UTC dates to keep for a window of local dates: local dates can sit up to a
/// day away from UTC dates.
fn utc_window(window_start: NaiveDate, window_end: NaiveDate) -> AppResult<DateRange> {
    Ok(DateRange::new(window_start, window_end)?.widened(1))
}

/// Events of one page, newest first, and whether the page reached pull
/// requests created before `window`.
fn select_page(
    login: &str,
    nodes: Vec<PullRequestNode>,
    window: DateRange,
) -> (Vec<RemoteEvent>, bool) {
    let mut events = Vec::new();
    let mut reached_older = false;

    for node in nodes {
        let created = match clock::parse_utc(&node.created_at) {
            Ok(ts) => ts,
            Err(e) => {
                warn!("Skipping pull request {} of {login}: {e}", node.id);
                continue;
            }
        };

        let created_date = created.date_naive();
        if created_date < window.start() {
            reached_older = true;
            continue;
        }
        if window.contains(created_date) {
            events.push(RemoteEvent {
                event_id: node.id,
                title: node.title,
                created_at_utc: created,
                repository: node.repository.name_with_owner,
            });
        }
    }

    (events, reached_older)
}

/// Walk the team member pages; `fetch` receives the cursor of the next page.
fn collect_roster<F>(organization: &str, team: &str, mut fetch: F) -> AppResult<Vec<RosterMember>>
where
    F: FnMut(Option<String>) -> AppResult<TeamData>,
{
    let mut members = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let data = fetch(cursor.take())?;

        let found = data.organization.and_then(|o| o.team).ok_or_else(|| {
            AppError::EntityNotFound(format!("team '{team}' in organization '{organization}'"))
        })?;

        let page = found.members;
        members.extend(page.nodes.into_iter().map(|m| RosterMember {
            login: m.login,
            name: non_blank(m.name),
            email: non_blank(m.email),
        }));

        match page.page_info.next_cursor() {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(members)
}

/// Walk the pull request pages of `login` (newest first) until the pages
/// run out or one reaches pull requests older than `window`.
fn collect_events<F>(login: &str, window: DateRange, mut fetch: F) -> AppResult<(Vec<RemoteEvent>, u32)>
where
    F: FnMut(Option<String>) -> AppResult<UserData>,
{
    let mut events = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let data = fetch(cursor.take())?;
        pages += 1;

        let user = data
            .user
            .ok_or_else(|| AppError::EntityNotFound(login.to_string()))?;
        let page = user.pull_requests;

        let (selected, reached_older) = select_page(login, page.nodes, window);
        events.extend(selected);

        if reached_older {
            break;
        }
        match page.page_info.next_cursor() {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok((events, pages))
}

impl EventSource for GitHubClient {
    fn fetch_roster(&self) -> AppResult<Vec<RosterMember>> {
        let members = collect_roster(&self.organization, &self.team, |cursor| {
            self.graphql(
                TEAM_MEMBERS_QUERY,
                json!({ "org": self.organization, "team": self.team, "cursor": cursor }),
            )
        })?;

        debug!("Fetched {} team members", members.len());
        Ok(members)
    }

    fn fetch_events(
        &self,
        login: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> AppResult<Vec<RemoteEvent>> {
        let window = utc_window(window_start, window_end)?;

        let (events, pages) = collect_events(login, window, |cursor| {
            self.graphql(
                USER_PULL_REQUESTS_QUERY,
                json!({ "username": login, "cursor": cursor }),
            )
        })?;

        debug!(
            "Fetched {} pull requests for {login} in {pages} page(s) of up to {PAGE_SIZE}",
            events.len()
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn pr_node(id: &str, created_at: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("PR {id}"),
            "createdAt": created_at,
            "repository": { "nameWithOwner": "acme/api" }
        })
    }

    fn user_page(nodes: Vec<serde_json::Value>, next: Option<&str>) -> String {
        json!({
            "data": {
                "user": {
                    "pullRequests": {
                        "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next },
                        "nodes": nodes
                    }
                }
            }
        })
        .to_string()
    }

    fn decode<T: DeserializeOwned>(body: &str) -> AppResult<T> {
        let parsed: GraphQlResponse<T> = serde_json::from_str(body).unwrap();
        parsed.into_data()
    }

    /// Serve `pages` in order, recording the cursor of each request.
    fn paged<T: DeserializeOwned>(
        pages: Vec<String>,
        cursors: &RefCell<Vec<Option<String>>>,
    ) -> impl FnMut(Option<String>) -> AppResult<T> + '_ {
        let mut pages = pages.into_iter();
        move |cursor| {
            cursors.borrow_mut().push(cursor);
            decode(&pages.next().expect("no more pages"))
        }
    }

    #[test]
    fn window_is_widened_by_one_day() {
        let w = utc_window(d("2024-03-05"), d("2024-03-06")).unwrap();
        assert_eq!((w.start(), w.end()), (d("2024-03-04"), d("2024-03-07")));
        assert!(utc_window(d("2024-03-06"), d("2024-03-05")).is_err());
    }

    #[test]
    fn page_keeps_nodes_inside_the_widened_window() {
        let window = utc_window(d("2024-03-05"), d("2024-03-06")).unwrap();
        let nodes: Vec<PullRequestNode> = serde_json::from_value(json!([
            pr_node("newer", "2024-03-08T10:00:00Z"),
            pr_node("edge_end", "2024-03-07T23:00:00Z"),
            pr_node("bad", "yesterday"),
            pr_node("edge_start", "2024-03-04T01:00:00Z"),
            pr_node("older", "2024-03-03T23:59:59Z"),
        ]))
        .unwrap();

        let (events, reached_older) = select_page("alice", nodes, window);

        let ids: Vec<_> = events.iter().map(|e| e.event_id.as_str()).collect();
        assert_eq!(ids, vec!["edge_end", "edge_start"]);
        assert_eq!(events[0].repository, "acme/api");
        assert!(reached_older);
    }

    #[test]
    fn paging_stops_at_the_first_page_reaching_older_nodes() {
        let window = utc_window(d("2024-03-05"), d("2024-03-06")).unwrap();
        let cursors = RefCell::new(Vec::new());
        let pages = vec![
            user_page(vec![pr_node("a", "2024-03-06T10:00:00Z")], Some("c1")),
            user_page(
                vec![
                    pr_node("b", "2024-03-05T10:00:00Z"),
                    pr_node("old", "2024-03-01T10:00:00Z"),
                ],
                Some("c2"),
            ),
            user_page(vec![pr_node("never", "2024-02-01T10:00:00Z")], None),
        ];

        let (events, pages) = collect_events("alice", window, paged(pages, &cursors)).unwrap();

        assert_eq!(pages, 2);
        assert_eq!(events.len(), 2);
        assert_eq!(*cursors.borrow(), vec![None, Some("c1".to_string())]);
    }

    #[test]
    fn last_page_ends_paging() {
        let window = utc_window(d("2024-03-05"), d("2024-03-06")).unwrap();
        let cursors = RefCell::new(Vec::new());
        let pages = vec![user_page(vec![pr_node("a", "2024-03-06T10:00:00Z")], None)];

        let (events, pages) = collect_events("alice", window, paged(pages, &cursors)).unwrap();
        assert_eq!((events.len(), pages), (1, 1));
    }

    #[test]
    fn null_user_is_entity_not_found() {
        let window = utc_window(d("2024-03-05"), d("2024-03-06")).unwrap();
        let cursors = RefCell::new(Vec::new());
        let pages = vec![json!({ "data": { "user": null } }).to_string()];

        let err = collect_events("ghost", window, paged(pages, &cursors)).unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(ref l) if l == "ghost"));
    }

    #[test]
    fn graphql_errors_make_the_source_unavailable() {
        let body = json!({
            "data": null,
            "errors": [{ "message": "rate limited" }, { "message": "try later" }]
        })
        .to_string();

        let err = decode::<UserData>(&body).err().unwrap();
        assert!(err.is_source_failure());
        assert!(err.to_string().contains("rate limited; try later"));

        let empty = decode::<UserData>("{}").err().unwrap();
        assert!(matches!(empty, AppError::SourceUnavailable(_)));
    }

    #[test]
    fn roster_is_collected_across_pages() {
        let cursors = RefCell::new(Vec::new());
        let page = |nodes: serde_json::Value, next: Option<&str>| {
            json!({
                "data": { "organization": { "team": { "members": {
                    "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next },
                    "nodes": nodes
                } } } }
            })
            .to_string()
        };
        let pages = vec![
            page(
                json!([{ "login": "alice", "name": "Alice", "email": "alice@acme.io" }]),
                Some("m1"),
            ),
            page(json!([{ "login": "bob", "name": "", "email": null }]), None),
        ];

        let members = collect_roster("acme", "core", paged(pages, &cursors)).unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].email.as_deref(), Some("alice@acme.io"));
        assert_eq!(members[1].name, None);
        assert_eq!(members[1].email, None);
        assert_eq!(*cursors.borrow(), vec![None, Some("m1".to_string())]);
    }

    #[test]
    fn missing_team_is_entity_not_found() {
        let cursors = RefCell::new(Vec::new());
        let pages = vec![json!({ "data": { "organization": { "team": null } } }).to_string()];

        let err = collect_roster("acme", "ghosts", paged(pages, &cursors)).unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }
}
