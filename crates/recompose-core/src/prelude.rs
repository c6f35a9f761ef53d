pub use crate::animatable::{AnimationEndReason, AnimationResult, Animatable, animate};
pub use crate::animation::{AnimationSpec, DecayAnimationSpec, Easing, VectorConverter};
pub use crate::clock::{delay, with_frame_nanos};
pub use crate::color::{Color, Shape};
pub use crate::effects::{
    Dispose, disposable_effect, effect, launched_effect, on_unmount, side_effect,
};
pub use crate::error::ComposeError;
pub use crate::geometry::{Rect, Size, Vec2};
pub use crate::locals::{
    Density, Dp, DpExt, Theme, density, dp_to_px, theme, with_density, with_theme,
};
pub use crate::modifier::Modifier;
pub use crate::resources::{R, painter_resource};
pub use crate::runtime::{
    Frame, Scheduler, keyed, remember, remember_state, remember_state_with_key,
    remember_with_key, restartable,
};
pub use crate::scope::{Scope, current_scope, scoped_effect};
pub use crate::signal::{Signal, signal};
pub use crate::state::derived_state_of;
pub use crate::task::{Job, launch};
pub use crate::view::{Scene, SceneNode, View, ViewId, ViewKind};
