//! Trait mocks and fixtures shared by the domain unit tests.

use async_trait::async_trait;
use meeting_ai::traits::analysis::Provider as AnalysisProvider;
use meeting_ai::traits::directory::Provider as DirectoryProvider;
use meeting_ai::traits::task_board::Provider as TaskBoardProvider;
use meeting_ai::types::analysis::Request;
use meeting_ai::types::task_board::{DirectoryUser, KnownPlan, NewTask, TaskDetailsUpdate};
use meeting_ai::{
    Error as MeetingAiError, ExtractedMeeting, MeetingDetails, MeetingExtractionResult,
    PlanAssociation, TaskDetails, TaskGroup, TaskPriority, TranscriptionTask,
};
use meeting_auth::error::Error as MeetingAuthError;
use meeting_auth::identity::{AuthenticatedSubject, IdentityVerifier};
use mockall::mock;

mock! {
    pub TaskBoard {}

    #[async_trait]
    impl TaskBoardProvider for TaskBoard {
        async fn create_plan(&self, title: &str) -> Result<String, MeetingAiError>;
        async fn create_task(&self, task: &NewTask) -> Result<String, MeetingAiError>;
        async fn update_task_details(
            &self,
            task_id: &str,
            details: &TaskDetailsUpdate,
        ) -> Result<(), MeetingAiError>;
        async fn list_plans(&self) -> Result<Vec<KnownPlan>, MeetingAiError>;
        fn provider_id(&self) -> &str;
    }
}

mock! {
    pub Directory {}

    #[async_trait]
    impl DirectoryProvider for Directory {
        async fn find_user_by_email(
            &self,
            email: &str,
        ) -> Result<Option<DirectoryUser>, MeetingAiError>;
    }
}

mock! {
    pub Analysis {}

    #[async_trait]
    impl AnalysisProvider for Analysis {
        async fn extract(&self, request: Request) -> Result<ExtractedMeeting, MeetingAiError>;
        fn provider_id(&self) -> &str;
        async fn verify_credentials(&self) -> Result<bool, MeetingAiError>;
    }
}

mock! {
    pub Identity {}

    #[async_trait]
    impl IdentityVerifier for Identity {
        async fn verify(
            &self,
            bearer_token: &str,
        ) -> Result<AuthenticatedSubject, MeetingAuthError>;
    }
}

pub fn task(title: &str) -> TranscriptionTask {
    TranscriptionTask::new(
        title,
        TaskDetails {
            description: format!("{title} details"),
            checklist_items: Vec::new(),
        },
    )
    .with_priority(TaskPriority::Important)
}

pub fn group(association: PlanAssociation, tasks: Vec<TranscriptionTask>) -> TaskGroup {
    TaskGroup::new(association, tasks, Some("Group description".to_string()))
        .expect("fixture task groups are valid")
}

pub fn result_with(
    groups: Vec<TaskGroup>,
    meeting_date: Option<&str>,
) -> MeetingExtractionResult {
    MeetingExtractionResult::new(
        MeetingDetails {
            title: Some("Weekly sync".to_string()),
            date: meeting_date.map(str::to_string),
        },
        groups,
        Some("Discussed the redesign".to_string()),
        meeting_date.map(str::to_string),
    )
    .expect("fixture extraction results are valid")
}
