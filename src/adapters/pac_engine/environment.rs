use async_trait::async_trait;
use boa_engine::vm::RuntimeLimits;
use boa_engine::{Context, JsString, JsValue, Source};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use url::{Host, Url};

use super::primitives;
use crate::domain::{ResolveError, Result};
use crate::ports::{PacEngineLoaderPort, PacEnginePort};

const PAC_UTILS: &str = include_str!("pac_utils.js");
const ENTRY_POINT: &str = "FindProxyForURL";

/// Bounds applied to every script environment.
#[derive(Debug, Clone, Copy)]
pub struct EngineLimits {
    /// Wall-clock budget for loading a script and for each evaluation.
    pub timeout: Duration,
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            loop_iteration_limit: 1_000_000,
            recursion_limit: 256,
        }
    }
}

struct FindProxyRequest {
    url: String,
    host: String,
    reply: oneshot::Sender<Result<Option<String>>>,
}

/// A PAC script loaded into its own JavaScript context.
///
/// The context is not `Send`, so it stays on a dedicated thread and is driven
/// through a channel. Dropping the engine closes the channel and ends the thread.
///
/// boa cannot interrupt running code. When a load or an evaluation overruns
/// its timeout the thread keeps running until the script finishes or hits a
/// runtime limit, and the engine reports itself dead so callers replace it.
pub struct BoaPacEngine {
    requests: mpsc::UnboundedSender<FindProxyRequest>,
    timeout: Duration,
    alive: AtomicBool,
}

impl BoaPacEngine {
    pub async fn load(pac_script: String, limits: EngineLimits) -> Result<Self> {
        let (requests, mut inbox) = mpsc::unbounded_channel::<FindProxyRequest>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        thread::Builder::new()
            .name("pac-engine".into())
            .spawn(move || {
                let mut context = match build_context(&pac_script, &limits) {
                    Ok(context) => {
                        let _ = ready_tx.send(Ok(()));
                        context
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                while let Some(request) = inbox.blocking_recv() {
                    let result = find_proxy(&mut context, &request.url, &request.host);
                    let _ = request.reply.send(result);
                }
                debug!("PAC engine thread stopped");
            })
            .map_err(|e| ResolveError::ScriptLoad(format!("Cannot start engine thread: {}", e)))?;

        match timeout(limits.timeout, ready_rx).await {
            Ok(Ok(Ok(()))) => Ok(Self {
                requests,
                timeout: limits.timeout,
                alive: AtomicBool::new(true),
            }),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(ResolveError::ScriptLoad("Engine thread exited during load".into())),
            Err(_) => {
                warn!("PAC script did not load within {:?}", limits.timeout);
                Err(ResolveError::Timeout)
            }
        }
    }

    fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

/// The `host` argument of `FindProxyForURL`: IPv6 literals lose their brackets.
fn script_host(target_url: &Url) -> Result<String> {
    match target_url.host() {
        Some(Host::Ipv6(addr)) => Ok(addr.to_string()),
        Some(host) => Ok(host.to_string()),
        None => Err(ResolveError::MissingHost),
    }
}

#[async_trait]
impl PacEnginePort for BoaPacEngine {
    async fn find_proxy(&self, target_url: &Url) -> Result<Option<String>> {
        if !self.is_alive() {
            return Err(ResolveError::ScriptEvaluation("PAC engine is no longer running".into()));
        }
        let host = script_host(target_url)?;

        let (reply, response) = oneshot::channel();
        if self
            .requests
            .send(FindProxyRequest {
                url: target_url.to_string(),
                host,
                reply,
            })
            .is_err()
        {
            self.mark_dead();
            return Err(ResolveError::ScriptEvaluation("PAC engine is no longer running".into()));
        }

        match timeout(self.timeout, response).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                self.mark_dead();
                Err(ResolveError::ScriptEvaluation("PAC engine dropped the request".into()))
            }
            Err(_) => {
                warn!("{} for {} did not finish within {:?}", ENTRY_POINT, target_url, self.timeout);
                self.mark_dead();
                Err(ResolveError::Timeout)
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

/// Host primitives first, then the utility library, then the site script.
fn build_context(pac_script: &str, limits: &EngineLimits) -> Result<Context> {
    let mut context = Context::default();

    let mut runtime_limits = RuntimeLimits::default();
    runtime_limits.set_loop_iteration_limit(limits.loop_iteration_limit);
    runtime_limits.set_recursion_limit(limits.recursion_limit);
    context.set_runtime_limits(runtime_limits);

    primitives::register(&mut context)
        .map_err(|e| ResolveError::ScriptLoad(format!("Cannot register host functions: {}", e)))?;

    context
        .eval(Source::from_bytes(PAC_UTILS))
        .map_err(|e| ResolveError::ScriptLoad(format!("PAC utilities: {}", e)))?;

    context
        .eval(Source::from_bytes(pac_script))
        .map_err(|e| ResolveError::ScriptLoad(e.to_string()))?;

    let entry_point = context
        .global_object()
        .get(JsString::from(ENTRY_POINT), &mut context)
        .map_err(|e| ResolveError::ScriptLoad(e.to_string()))?;
    if !entry_point.is_callable() {
        return Err(ResolveError::ScriptLoad(format!("{} is not defined as a function", ENTRY_POINT)));
    }

    Ok(context)
}

fn find_proxy(context: &mut Context, url: &str, host: &str) -> Result<Option<String>> {
    let entry_point = context
        .global_object()
        .get(JsString::from(ENTRY_POINT), context)
        .map_err(|e| ResolveError::ScriptEvaluation(e.to_string()))?;
    let function = entry_point
        .as_callable()
        .ok_or_else(|| ResolveError::ScriptEvaluation(format!("{} is not a function", ENTRY_POINT)))?;

    let args = [
        JsValue::from(JsString::from(url)),
        JsValue::from(JsString::from(host)),
    ];
    let result = function
        .call(&JsValue::undefined(), &args, context)
        .map_err(|e| ResolveError::ScriptEvaluation(e.to_string()))?;

    Ok(result.as_string().map(|s| s.to_std_string_escaped()))
}

/// Builds a [`BoaPacEngine`] per loaded script.
#[derive(Debug, Clone, Default)]
pub struct BoaEngineLoader {
    limits: EngineLimits,
}

impl BoaEngineLoader {
    pub fn new(limits: EngineLimits) -> Self {
        Self { limits }
    }
}

#[async_trait]
impl PacEngineLoaderPort for BoaEngineLoader {
    async fn load(&self, pac_script: String) -> Result<Arc<dyn PacEnginePort>> {
        let engine = BoaPacEngine::load(pac_script, self.limits).await?;
        Ok(Arc::new(engine))
    }
}
