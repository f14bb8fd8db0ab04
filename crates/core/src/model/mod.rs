mod comment;
mod course_module;
mod ids;
mod progress;
mod segment;
mod user;

pub use ids::{CommentId, ModuleId, ParseIdError, SegmentId, UserId};

pub use comment::{Comment, CommentDraft, CommentError, MAX_COMMENT_CHARS, ValidatedComment};
pub use course_module::CourseModule;
pub use progress::{CourseCompletion, ProgressRecord};
pub use segment::{MAX_TITLE_CHARS, Segment, SegmentDraft, SegmentError, ValidatedSegment};
pub use user::{MAX_DISPLAY_NAME_CHARS, Role, User, UserDraft, UserError, ValidatedUser};
