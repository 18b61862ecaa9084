//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants, particularly
//! for handing validated records to a [`RecordSink`](crate::persistence::RecordSink).

/// Create an `Effect::Future` that saves a record through a `RecordSink`
///
/// The sink expression must be an `Arc<dyn RecordSink<T>>` (or any `Arc` of a sink);
/// it is cloned into the future. Both callbacks return `Option<Action>`, which the
/// runtime feeds back into the reducer.
///
/// # Example
///
/// ```rust,ignore
/// use shopfront_core::save_record;
///
/// save_record! {
///     sink: env.orders,
///     record: submission,
///     on_success: |record_id| Some(OrderFormAction::Saved { record_id, revision }),
///     on_error: |error| Some(OrderFormAction::SaveFailed { error: error.to_string() })
/// }
/// ```
#[macro_export]
macro_rules! save_record {
    (
        sink: $sink:expr,
        record: $record:expr,
        on_success: |$success_param:ident| $success_body:expr,
        on_error: |$error_param:ident| $error_body:expr
    ) => {{
        let sink = ::std::sync::Arc::clone(&$sink);
        let record = $record;
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match sink.save(record).await {
                Ok($success_param) => $success_body,
                Err($error_param) => $error_body,
            }
        }))
    }};
}

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use shopfront_core::async_effect;
///
/// async_effect! {
///     let price = pricing_service.quote(product_id).await?;
///     Some(OrderFormAction::QuoteReceived { price })
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
