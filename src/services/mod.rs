pub mod mood_gate;
pub mod recommendations;
pub mod refresh;
pub mod users;
pub mod voice_gate;
pub mod watched_movies;

pub use mood_gate::MoodGate;
pub use recommendations::RecommendationService;
pub use users::{SignupRequest, UserService};
pub use voice_gate::{VoiceGate, VoiceMatch, VoiceSample};
pub use watched_movies::WatchedMovieTracker;
