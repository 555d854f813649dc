//! Declarative macros for ergonomic effect construction
//!
//! Reducers spend most of their effect code wrapping an API call in a boxed
//! future. `async_effect!` keeps that boilerplate out of the match arms.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use busway_core::async_effect;
///
/// async_effect! {
///     match api.get_bus(bus_id).await {
///         Ok(bus) => Some(SeatsAction::BusLoaded { bus }),
///         Err(error) => Some(SeatsAction::LoadFailed { error: error.to_string() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
