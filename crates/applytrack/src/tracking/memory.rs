use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::criteria::FilterCriterion;
use super::domain::{
    ApplicationId, ApplicationRecord, CoverLetter, CoverLetterId, Resume, ResumeId, UserId,
};
use super::lookup::{ApplicationLookup, LookupError};

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeSet<UserId>,
    applications: BTreeMap<ApplicationId, ApplicationRecord>,
    resumes: HashMap<ResumeId, Resume>,
    cover_letters: HashMap<CoverLetterId, CoverLetter>,
}

impl StoreState {
    fn ensure_user(&self, user_id: UserId) -> Result<(), LookupError> {
        if self.users.contains(&user_id) {
            Ok(())
        } else {
            Err(LookupError::UserNotFound(user_id))
        }
    }

    fn owned_by(&self, user_id: UserId) -> impl Iterator<Item = &ApplicationRecord> {
        self.applications
            .values()
            .filter(move |record| record.user_id == user_id)
    }
}

/// Process-local store used by the service binary, the CLI, and tests.
///
/// Applications are returned in ascending id order, mirroring insertion order for
/// sequentially assigned ids.
#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicationStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryApplicationStore {
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }

    pub fn insert_user(&self, user_id: UserId) {
        self.state().users.insert(user_id);
    }

    /// Stores an application, registering its owner if needed.
    pub fn insert_application(&self, record: ApplicationRecord) {
        let mut state = self.state();
        state.users.insert(record.user_id);
        state.applications.insert(record.id, record);
    }

    pub fn insert_resume(&self, resume: Resume) {
        self.state().resumes.insert(resume.id, resume);
    }

    pub fn insert_cover_letter(&self, cover_letter: CoverLetter) {
        self.state()
            .cover_letters
            .insert(cover_letter.id, cover_letter);
    }

    /// Deletes a resume while leaving applications that reference it untouched.
    pub fn remove_resume(&self, resume_id: ResumeId) -> Option<Resume> {
        self.state().resumes.remove(&resume_id)
    }

    pub fn application_count(&self) -> usize {
        self.state().applications.len()
    }
}

impl ApplicationLookup for InMemoryApplicationStore {
    async fn find_by_criterion(
        &self,
        user_id: UserId,
        criterion: &FilterCriterion,
    ) -> Result<Vec<ApplicationRecord>, LookupError> {
        let state = self.state();
        state.ensure_user(user_id)?;
        Ok(state
            .owned_by(user_id)
            .filter(|record| criterion.matches(record))
            .cloned()
            .collect())
    }

    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<ApplicationRecord>, LookupError> {
        let state = self.state();
        state.ensure_user(user_id)?;
        Ok(state.owned_by(user_id).cloned().collect())
    }

    async fn find_application(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> Result<Option<ApplicationRecord>, LookupError> {
        let state = self.state();
        state.ensure_user(user_id)?;
        Ok(state
            .applications
            .get(&application_id)
            .filter(|record| record.user_id == user_id)
            .cloned())
    }

    async fn find_resume(&self, resume_id: ResumeId) -> Result<Option<Resume>, LookupError> {
        Ok(self.state().resumes.get(&resume_id).cloned())
    }

    async fn find_cover_letter(
        &self,
        cover_letter_id: CoverLetterId,
    ) -> Result<Option<CoverLetter>, LookupError> {
        Ok(self.state().cover_letters.get(&cover_letter_id).cloned())
    }
}
