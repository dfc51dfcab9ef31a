//! Blocking GitHub client for one organisation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use mirror_core::{Config, MirrorError, MirrorTarget, RemoteHost, RemoteRepository, Secret};

use crate::error::from_ureq;

const USER_AGENT: &str = concat!("mirror-forge/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";

pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    ssh_host: String,
    org: String,
    token: Secret,
}

/// Body of `POST /orgs/{org}/repos`.
#[derive(Debug, Serialize)]
pub struct CreateRepository<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub homepage: &'a str,
    pub private: bool,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_downloads: bool,
}

impl<'a> CreateRepository<'a> {
    /// Public, with issues and wiki off: the forge stays the place to
    /// discuss the code.
    pub fn for_target(target: &'a MirrorTarget) -> Self {
        Self {
            name: &target.repo_name,
            description: &target.description,
            homepage: &target.homepage_uri,
            private: false,
            has_issues: false,
            has_wiki: false,
            has_downloads: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name: String,
    ssh_url: String,
}

impl From<RepositoryPayload> for RemoteRepository {
    fn from(p: RepositoryPayload) -> Self {
        RemoteRepository {
            name: p.name,
            mirror_uri: p.ssh_url,
        }
    }
}

impl GitHubClient {
    pub fn new(api_url: &str, org: &str, token: Secret, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let api_url = api_url.trim_end_matches('/').to_string();
        Self {
            agent,
            ssh_host: ssh_host_for(&api_url),
            api_url,
            org: org.to_string(),
            token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.github_api_url,
            &config.github_org,
            config.github.clone(),
            config.timeout,
        )
    }

    /// `{api_url}/{segments…}` with every segment percent-encoded, so a
    /// name can never add path segments or a query string.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, MirrorError> {
        let mut url = Url::parse(&self.api_url).map_err(|err| {
            MirrorError::Protocol(format!("invalid GitHub API URL {}: {err}", self.api_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                MirrorError::Protocol(format!("GitHub API URL {} has no path", self.api_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: &str, url: &Url) -> ureq::Request {
        self.agent
            .request(method, url.as_str())
            .set("Authorization", &format!("token {}", self.token.expose()))
            .set("User-Agent", USER_AGENT)
            .set("Accept", ACCEPT)
    }
}

impl RemoteHost for GitHubClient {
    fn owner(&self) -> &str {
        &self.org
    }

    fn remote_name(&self, forge_name: &str) -> String {
        github_repo_name(forge_name)
    }

    fn find_repository(&self, name: &str) -> Result<Option<RemoteRepository>, MirrorError> {
        let name = self.remote_name(name);
        let name = name.as_str();
        let action = format!("look up {}/{name}", self.org);
        let url = self.endpoint(&["repos", &self.org, name])?;
        let response = match self.request("GET", &url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => {
                tracing::debug!(org = %self.org, name, "remote repository absent");
                return Ok(None);
            }
            Err(err) => return Err(from_ureq(&action, err)),
        };
        let payload: RepositoryPayload = response
            .into_json()
            .map_err(|err| MirrorError::Protocol(format!("{action}: {err}")))?;
        tracing::debug!(org = %self.org, name, uri = %payload.ssh_url, "remote repository present");
        Ok(Some(payload.into()))
    }

    fn create_repository(&self, target: &MirrorTarget) -> Result<RemoteRepository, MirrorError> {
        let name = self.remote_name(&target.repo_name);
        let action = format!("create {}/{name}", target.owner);
        let url = self.endpoint(&["orgs", &target.owner, "repos"])?;
        let body = CreateRepository {
            name: &name,
            ..CreateRepository::for_target(target)
        };
        let response = self
            .request("POST", &url)
            .send_json(body)
            .map_err(|err| from_ureq(&action, err))?;
        let payload: RepositoryPayload = response
            .into_json()
            .map_err(|err| MirrorError::Protocol(format!("{action}: {err}")))?;
        tracing::info!(org = %target.owner, name = %payload.name, "remote repository created");
        Ok(payload.into())
    }

    fn expected_mirror_uri(&self, target: &MirrorTarget) -> String {
        ssh_url(&self.ssh_host, &target.owner, &self.remote_name(&target.repo_name))
    }
}

/// GitHub replaces every character outside `[A-Za-z0-9._-]` with `-` when
/// it creates a repository.
pub fn github_repo_name(forge_name: &str) -> String {
    forge_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// The form GitHub reports as `ssh_url`.
pub fn ssh_url(host: &str, owner: &str, name: &str) -> String {
    format!("git@{host}:{owner}/{name}.git")
}

/// `https://api.github.com` → `github.com`; Enterprise
/// `https://ghe.example/api/v3` → `ghe.example`.
pub fn ssh_host_for(api_url: &str) -> String {
    let without_scheme = api_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(api_url);
    let host = without_scheme.split('/').next().unwrap_or(without_scheme);
    let host = host.split(':').next().unwrap_or(host);
    host.strip_prefix("api.").unwrap_or(host).to_string()
}
