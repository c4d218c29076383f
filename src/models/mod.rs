pub mod task;
pub mod user;

pub use task::{CreateTaskInput, Task, TaskFilter, TaskStatus, UpdateTaskStatusInput};
pub use user::{AuthCredentials, SignInResponse, User};
