pub mod activity_state;
pub mod daily_activity;
pub mod entity;
pub mod event;
pub mod period_summary;

pub use activity_state::ActivityState;
pub use daily_activity::DailyActivity;
pub use entity::Entity;
pub use event::Event;
pub use period_summary::PeriodSummary;
