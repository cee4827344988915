pub mod company;
pub mod entry;
pub mod reference;
pub mod user;

pub use company::{
    CompanyStatus, InterviewExperience, InterviewOutcome, NewCompanyRequest, Priority, Question,
    QuestionStatus, TargetCompany, UpdateCompanyRequest, UpdateInterviewRequest,
    UpdateQuestionRequest,
};
pub use entry::{Entry, NewEntryRequest, NewTopicRequest, SearchParams, UpdateEntryRequest};
pub use reference::{NewReferenceRequest, ReferenceMaterial, UpdateReferenceRequest};
pub use user::{AuthResponse, LoginRequest, SignupRequest, UpdateFolderRequest, User, UserProfile};
