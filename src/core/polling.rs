//! 轮询调度
//!
//! 两个互相独立的定时器：常驻轮询在客户端初始化后一直运行，
//! 监控轮询只在监控开启期间运行且周期更短。每种定时器同一时刻最多一个。
//!
//! 同一定时器的两次 tick 不会重叠：处理函数在定时器任务内顺序执行，
//! 超时的 tick 顺延。定时器停止时正在进行的请求随任务一起丢弃。

use super::context::SyncContext;
use super::log_sync::MergeMode;
use crate::config::{MAX_POLL_INTERVAL_SECS, MIN_POLL_INTERVAL_SECS};
use crate::error::ClientResult;
use crate::gateway::MonitoringStarted;
use crate::models::MonitoringState;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 定时器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// 常驻轮询：状态 + 监控状态 + 日志
    Ambient,
    /// 监控轮询：只拉日志
    Monitoring,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerKind::Ambient => write!(f, "ambient"),
            TimerKind::Monitoring => write!(f, "monitoring"),
        }
    }
}

struct PollTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct Timers {
    ambient: Option<PollTimer>,
    monitoring: Option<PollTimer>,
    ambient_period: Duration,
    monitoring_period: Duration,
}

impl Timers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<PollTimer> {
        match kind {
            TimerKind::Ambient => &mut self.ambient,
            TimerKind::Monitoring => &mut self.monitoring,
        }
    }

    fn period(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::Ambient => self.ambient_period,
            TimerKind::Monitoring => self.monitoring_period,
        }
    }
}

/// 轮询协调器
pub struct PollingCoordinator {
    ctx: Arc<SyncContext>,
    timers: Mutex<Timers>,
    /// 每次监控启停加一，用于丢弃启停之前发出的监控状态查询结果
    generation: AtomicU64,
    live_ambient: Arc<AtomicUsize>,
    live_monitoring: Arc<AtomicUsize>,
    shutdown: CancellationToken,
}

impl PollingCoordinator {
    pub fn new(ctx: Arc<SyncContext>, ambient_period: Duration, monitoring_period: Duration) -> Self {
        Self {
            ctx,
            timers: Mutex::new(Timers {
                ambient: None,
                monitoring: None,
                ambient_period: clamp_period(ambient_period),
                monitoring_period: clamp_period(monitoring_period),
            }),
            generation: AtomicU64::new(0),
            live_ambient: Arc::new(AtomicUsize::new(0)),
            live_monitoring: Arc::new(AtomicUsize::new(0)),
            shutdown: CancellationToken::new(),
        }
    }

    /// 启动常驻轮询（已在运行时重启）
    pub async fn start(self: &Arc<Self>) {
        let mut timers = self.timers.lock().await;
        self.restart_timer_locked(&mut timers, TimerKind::Ambient).await;
    }

    /// 修改轮询周期，超出范围时取下限或上限；正在运行的定时器按新周期重启
    pub async fn set_polling_interval(self: &Arc<Self>, kind: TimerKind, period: Duration) -> Duration {
        let period = clamp_period(period);
        let mut timers = self.timers.lock().await;

        match kind {
            TimerKind::Ambient => timers.ambient_period = period,
            TimerKind::Monitoring => timers.monitoring_period = period,
        }

        if timers.slot(kind).is_some() {
            self.restart_timer_locked(&mut timers, kind).await;
        }

        info!("{} 轮询周期设为 {:?}", kind, period);
        period
    }

    pub async fn polling_interval(&self, kind: TimerKind) -> Duration {
        self.timers.lock().await.period(kind)
    }

    /// 请求服务器开始监控，成功后启动监控轮询
    ///
    /// 这里只记录状态不渲染，界面的等待状态由下一次 `refresh_monitoring` 结束。
    pub async fn start_monitoring(self: &Arc<Self>) -> ClientResult<MonitoringStarted> {
        let started = self.ctx.gateway.start_monitoring().await?;

        {
            let mut timers = self.timers.lock().await;
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.ctx
                .store_monitoring(MonitoringState {
                    is_running: true,
                    protected_file_count: started.protected_count,
                })
                .await;
            self.restart_timer_locked(&mut timers, TimerKind::Monitoring)
                .await;
        }

        info!("监控已启动，受保护 {} 个文件", started.protected_count);
        Ok(started)
    }

    /// 请求服务器停止监控，成功后停止监控轮询
    pub async fn stop_monitoring(self: &Arc<Self>) -> ClientResult<String> {
        let message = self.ctx.gateway.stop_monitoring().await?;

        {
            let mut timers = self.timers.lock().await;
            self.generation.fetch_add(1, Ordering::SeqCst);
            let current = self.ctx.state.lock().await.monitoring();
            self.ctx
                .store_monitoring(MonitoringState {
                    is_running: false,
                    ..current
                })
                .await;
            Self::stop_timer_locked(&mut timers, TimerKind::Monitoring).await;
        }

        info!("监控已停止");
        Ok(message)
    }

    /// 立即查询一次监控状态并按结果调整监控轮询
    pub async fn refresh_monitoring(self: &Arc<Self>) -> ClientResult<MonitoringState> {
        let generation = self.generation.load(Ordering::SeqCst);
        let state = self.ctx.gateway.fetch_monitoring_status().await?;
        self.apply_monitoring_state(state, generation).await;
        Ok(state)
    }

    /// 停止全部定时器，之后不会再有任何 tick
    pub async fn teardown(&self) {
        self.shutdown.cancel();
        let mut timers = self.timers.lock().await;
        Self::stop_timer_locked(&mut timers, TimerKind::Ambient).await;
        Self::stop_timer_locked(&mut timers, TimerKind::Monitoring).await;
        debug!("轮询已全部停止");
    }

    pub async fn is_active(&self, kind: TimerKind) -> bool {
        self.timers.lock().await.slot(kind).is_some()
    }

    /// 当前存活的定时器任务数
    pub fn live_timers(&self, kind: TimerKind) -> usize {
        self.live_counter(kind).load(Ordering::SeqCst)
    }

    fn live_counter(&self, kind: TimerKind) -> &Arc<AtomicUsize> {
        match kind {
            TimerKind::Ambient => &self.live_ambient,
            TimerKind::Monitoring => &self.live_monitoring,
        }
    }

    async fn apply_monitoring_state(self: &Arc<Self>, state: MonitoringState, generation: u64) {
        let mut timers = self.timers.lock().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("监控状态已变更，丢弃过期的查询结果");
            return;
        }

        self.ctx.set_monitoring(state).await;

        // 监控可能由其他客户端启停
        match (state.is_running, timers.monitoring.is_some()) {
            (true, false) => {
                self.restart_timer_locked(&mut timers, TimerKind::Monitoring)
                    .await
            }
            (false, true) => Self::stop_timer_locked(&mut timers, TimerKind::Monitoring).await,
            _ => {}
        }
    }

    async fn restart_timer_locked(self: &Arc<Self>, timers: &mut Timers, kind: TimerKind) {
        Self::stop_timer_locked(timers, kind).await;

        if self.shutdown.is_cancelled() {
            debug!("已关闭，不再启动 {} 轮询", kind);
            return;
        }

        let period = timers.period(kind);
        *timers.slot(kind) = Some(self.spawn_timer(kind, period));
        debug!("{} 轮询已启动，周期 {:?}", kind, period);
    }

    /// 取消并等待任务结束；等待途中被丢弃时句柄仍留在槽位里，由下一次停止继续等待
    async fn stop_timer_locked(timers: &mut Timers, kind: TimerKind) {
        let slot = timers.slot(kind);
        if let Some(timer) = slot.as_mut() {
            timer.cancel.cancel();
            if let Err(e) = (&mut timer.handle).await {
                warn!("{} 轮询任务异常结束: {}", kind, e);
            }
            *slot = None;
            debug!("{} 轮询已停止", kind);
        }
    }

    fn spawn_timer(self: &Arc<Self>, kind: TimerKind, period: Duration) -> PollTimer {
        let cancel = self.shutdown.child_token();
        let token = cancel.clone();
        let weak: Weak<Self> = Arc::downgrade(self);

        let live = self.live_counter(kind).clone();
        live.fetch_add(1, Ordering::SeqCst);
        let live_guard = scopeguard::guard(live, |live| {
            live.fetch_sub(1, Ordering::SeqCst);
        });

        let handle = tokio::spawn(async move {
            let _live_guard = live_guard;
            let now = Instant::now();
            let start = now.checked_add(period).unwrap_or(now);
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let Some(this) = weak.upgrade() else { break };
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = this.run_tick(kind) => {}
                }
            }
        });

        PollTimer { cancel, handle }
    }

    async fn run_tick(self: &Arc<Self>, kind: TimerKind) {
        match kind {
            TimerKind::Ambient => self.ambient_tick().await,
            TimerKind::Monitoring => {
                if let Err(e) = self.ctx.refresh_logs(MergeMode::Incremental).await {
                    debug!("监控轮询拉取日志失败: {}", e);
                }
            }
        }
    }

    /// 三项查询互不影响，任一失败不阻塞其他
    async fn ambient_tick(self: &Arc<Self>) {
        let (status, monitoring, logs) = tokio::join!(
            self.ctx.refresh_status(),
            self.refresh_monitoring(),
            self.ctx.refresh_logs(MergeMode::Incremental),
        );

        if let Err(e) = status {
            debug!("常驻轮询: 状态查询失败: {}", e);
        }
        if let Err(e) = monitoring {
            debug!("常驻轮询: 监控状态查询失败: {}", e);
        }
        if let Err(e) = logs {
            debug!("常驻轮询: 日志拉取失败: {}", e);
        }
    }
}

fn clamp_period(period: Duration) -> Duration {
    period.clamp(
        Duration::from_secs(MIN_POLL_INTERVAL_SECS),
        Duration::from_secs(MAX_POLL_INTERVAL_SECS),
    )
}
