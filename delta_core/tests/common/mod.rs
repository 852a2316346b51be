#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use camino::Utf8PathBuf;
use delta_api::{Deployment, DeploymentStatus};
use delta_core::{RepositoryCoordinates, RevisionId};
use delta_hosting_api::{
    CompareFile, Comparison, HostingApi, HostingError, HostingResult, Page,
};
use git2::{IndexAddOption, Repository as GitRepository, RepositoryInitOptions};
use tempfile::TempDir;

/// In-memory hosting backend with call recording.
#[derive(Default)]
pub struct StubHosting {
    pub pages: Vec<Page<Deployment>>,
    pub statuses: HashMap<u64, Vec<DeploymentStatus>>,
    pub failing_statuses: HashSet<u64>,
    pub fail_listing: bool,
    pub references: HashMap<String, RevisionId>,
    pub comparison: Option<Comparison>,
    pub list_calls: AtomicU32,
    pub status_calls: Mutex<Vec<u64>>,
    pub compare_calls: Mutex<Vec<(RevisionId, RevisionId)>>,
}

impl StubHosting {
    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> Vec<u64> {
        self.status_calls.lock().expect("status calls").clone()
    }

    pub fn compare_calls(&self) -> Vec<(RevisionId, RevisionId)> {
        self.compare_calls.lock().expect("compare calls").clone()
    }
}

fn not_found(url: &str) -> HostingError {
    HostingError::Status {
        url: url.to_owned(),
        status: 404,
        message: "Not Found".into(),
    }
}

impl HostingApi for StubHosting {
    fn id(&self) -> &'static str {
        "stub"
    }

    fn list_deployments(
        &self,
        _repo: &RepositoryCoordinates,
        _environment: &str,
        page: u32,
        _per_page: u32,
    ) -> HostingResult<Page<Deployment>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(HostingError::Status {
                url: "deployments".into(),
                status: 500,
                message: "Internal Server Error".into(),
            });
        }
        let index = usize::try_from(page.saturating_sub(1)).expect("page index");
        Ok(self
            .pages
            .get(index)
            .cloned()
            .unwrap_or_else(|| Page::last(Vec::new())))
    }

    fn list_deployment_statuses(
        &self,
        _repo: &RepositoryCoordinates,
        deployment_id: u64,
        _per_page: u32,
    ) -> HostingResult<Vec<DeploymentStatus>> {
        self.status_calls
            .lock()
            .expect("status calls")
            .push(deployment_id);
        if self.failing_statuses.contains(&deployment_id) {
            return Err(HostingError::message("status lookup failed"));
        }
        Ok(self
            .statuses
            .get(&deployment_id)
            .cloned()
            .unwrap_or_default())
    }

    fn get_reference(
        &self,
        _repo: &RepositoryCoordinates,
        reference: &str,
    ) -> HostingResult<RevisionId> {
        self.references
            .get(reference)
            .cloned()
            .ok_or_else(|| not_found(reference))
    }

    fn compare_commits(
        &self,
        _repo: &RepositoryCoordinates,
        base: &RevisionId,
        head: &RevisionId,
    ) -> HostingResult<Comparison> {
        self.compare_calls
            .lock()
            .expect("compare calls")
            .push((base.clone(), head.clone()));
        self.comparison
            .clone()
            .ok_or_else(|| not_found(&format!("compare/{base}...{head}")))
    }
}

pub fn coords() -> RepositoryCoordinates {
    RepositoryCoordinates::parse("test-owner/test-repo")
}

pub fn deployment(id: u64, sha: &str) -> Deployment {
    Deployment {
        id,
        sha: sha.to_owned(),
    }
}

pub fn status(state: &str) -> DeploymentStatus {
    DeploymentStatus {
        state: state.to_owned(),
    }
}

pub fn comparison(files: &[&str]) -> Comparison {
    Comparison {
        files: files
            .iter()
            .map(|name| CompareFile {
                filename: (*name).to_owned(),
                status: None,
            })
            .collect(),
    }
}

/// Scratch repository whose initial branch is `main`.
pub struct GitFixture {
    pub dir: TempDir,
    pub repo: GitRepository,
}

impl GitFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = GitRepository::init_opts(dir.path(), &opts).expect("init repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).expect("utf8 tempdir")
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, contents).expect("write file");
    }

    pub fn remove(&self, relative: &str) {
        std::fs::remove_file(self.dir.path().join(relative)).expect("remove file");
    }

    pub fn rename(&self, from: &str, to: &str) {
        std::fs::rename(self.dir.path().join(from), self.dir.path().join(to))
            .expect("rename file");
    }

    /// Stage every change in the worktree and commit it on HEAD.
    pub fn commit(&self, message: &str) -> RevisionId {
        let mut index = self.repo.index().expect("index");
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .expect("add all");
        index.update_all(["*"], None).expect("update all");
        index.write().expect("write index");
        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");
        let signature = git2::Signature::now("Test", "test@example.com").expect("signature");

        let parents = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok())
            .into_iter()
            .collect::<Vec<_>>();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .expect("commit");
        RevisionId::new(oid.to_string())
    }

    /// Create `name` pointing at `target`.
    pub fn branch(&self, name: &str, target: &RevisionId) {
        let oid = git2::Oid::from_str(target.as_str()).expect("oid");
        let commit = self.repo.find_commit(oid).expect("find commit");
        self.repo.branch(name, &commit, false).expect("create branch");
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
