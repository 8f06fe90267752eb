//! ノードモニター
//!
//! 1サイクルで静的ノードとライブノードを並列にプローブし、
//! 全プローブの完了を待ってから利用可能ノードのスナップショットを
//! 1回の`Arc`差し替えで公開する。

use crate::balancer::{NodeSelector, SelectQuery};
use crate::common::error::{ProbeError, RouterResult};
use crate::common::types::{ContainerSummary, Hostname, NodeRecord};
use crate::config::{MonitorConfig, RouterConfig};
use crate::discovery::{DirectoryClient, LiveNodeSource};
use crate::health::prober::{ProbeOutcome, Prober};
use crate::registry::{apply_outcome, NodeRegistry, Snapshot, Transition};
use crate::shutdown::{MonitorState, ShutdownController};
use arc_swap::ArcSwap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

type ProbeTasks = Vec<(Hostname, JoinHandle<ProbeOutcome>)>;

/// ノードモニター
///
/// `Clone`したハンドル同士で同じレジストリ・スナップショット・停止状態を共有する。
#[derive(Clone)]
pub struct NodeMonitor {
    config: MonitorConfig,
    registry: NodeRegistry,
    prober: Prober,
    live_source: Option<Arc<dyn LiveNodeSource>>,
    snapshot: Arc<ArcSwap<Snapshot>>,
    shutdown: ShutdownController,
    cycles: Arc<AtomicU64>,
    cycle_lock: Arc<Mutex<()>>,
}

impl NodeMonitor {
    /// 新しいモニターを作成
    pub fn new(config: MonitorConfig, registry: NodeRegistry, prober: Prober) -> Self {
        Self {
            config,
            registry,
            prober,
            live_source: None,
            snapshot: Arc::new(ArcSwap::from_pointee(Snapshot::empty())),
            shutdown: ShutdownController::default(),
            cycles: Arc::new(AtomicU64::new(0)),
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 設定と静的ノード一覧から組み立てる
    ///
    /// ディレクトリAPIが設定されていればライブノード取得元として使う。
    pub fn from_config(config: &RouterConfig, nodes: Vec<Hostname>) -> RouterResult<Self> {
        config.validate()?;
        let registry = NodeRegistry::new(nodes)?;
        let prober = Prober::new(config.monitor.probe_timeout)?;
        let mut monitor = Self::new(config.monitor, registry, prober);
        if let Some(directory) = &config.directory {
            info!(api_url = %directory.api_url, "Live node discovery enabled");
            monitor = monitor.with_live_source(Arc::new(DirectoryClient::new(directory)?));
        }
        Ok(monitor)
    }

    /// ライブノード取得元を設定
    pub fn with_live_source(mut self, source: Arc<dyn LiveNodeSource>) -> Self {
        self.live_source = Some(source);
        self
    }

    /// 監視設定
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// 静的ノードレジストリ
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// 現在のライフサイクル状態
    pub fn state(&self) -> MonitorState {
        self.shutdown.state()
    }

    /// 最新の公開済みスナップショット
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// 読み取り側のハンドル
    pub fn selector(&self) -> NodeSelector {
        NodeSelector::new(self.snapshot.clone())
    }

    /// 要求コンテナを稼働する負荷の低いノードを返す
    pub fn select_nodes(
        &self,
        required: &BTreeSet<String>,
        limit: usize,
        offset: usize,
    ) -> Vec<Hostname> {
        self.selector().select_nodes(required, limit, offset)
    }

    /// クエリでノードを選択
    pub fn select(&self, query: &SelectQuery) -> Vec<Hostname> {
        self.selector().select(query)
    }

    /// 利用可能ノード全体のコンテナ集計
    pub fn list_containers(&self) -> Vec<ContainerSummary> {
        self.selector().list_containers()
    }

    /// 停止を要求する（冪等）
    ///
    /// 実行中のプローブは中断せず、ループはサイクル先頭で停止を検知する。
    pub fn stop(&self) {
        if self.shutdown.request_shutdown() {
            info!("Stopping node monitor");
        }
    }

    /// バックグラウンドで監視ループを開始
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run_forever().await;
        })
    }

    /// 停止されるまでサイクルを繰り返す
    pub async fn run_forever(&self) {
        info!(
            interval_secs = self.config.refresh_interval.as_secs_f64(),
            probe_timeout_secs = self.config.probe_timeout.as_secs_f64(),
            "Node monitor started"
        );

        while self.state() == MonitorState::Running {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.config.refresh_interval) => {}
                _ = self.shutdown.wait() => {}
            }
        }

        self.shutdown.mark_stopped();
        info!(cycles = self.cycles.load(Ordering::SeqCst), "Node monitor stopped");
    }

    /// 1サイクル実行し、公開したスナップショットを返す
    ///
    /// 所要時間の上限はディレクトリAPIのタイムアウトとプローブタイムアウトの和。
    pub async fn run_cycle(&self) -> Arc<Snapshot> {
        let _cycle_guard = self.cycle_lock.lock().await;

        // 静的ノードのプローブを先に開始し、ライブノード取得と並行させる
        let static_hosts = self.registry.hosts().await;
        let static_tasks = self.spawn_probes(static_hosts.iter().cloned());

        let live_hosts: Vec<Hostname> = match &self.live_source {
            Some(source) => source
                .fetch_live_nodes()
                .await
                .into_iter()
                .filter(|host| static_hosts.binary_search(host).is_err())
                .collect(),
            None => Vec::new(),
        };
        let live_tasks = self.spawn_probes(live_hosts.into_iter());

        let static_results = join_probes(static_tasks).await;
        let live_results = join_probes(live_tasks).await;

        let (mut combined, static_transitions) = self.registry.apply(static_results).await;
        for (host, transition) in &static_transitions {
            transition.log(host);
        }

        let previous = self.snapshot.load_full();
        let live_count = live_results.len();
        for (host, transition) in merge_live(&previous, &mut combined, live_results) {
            transition.log(&host);
        }

        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(Snapshot::from_records(cycle, combined));
        self.snapshot.store(snapshot.clone());

        debug!(
            cycle,
            nodes = ?snapshot.hostnames(),
            count = snapshot.len(),
            static_nodes = static_hosts.len(),
            live_nodes = live_count,
            "Available nodes"
        );

        snapshot
    }

    fn spawn_probes(&self, hosts: impl Iterator<Item = Hostname>) -> ProbeTasks {
        hosts
            .map(|host| {
                let prober = self.prober.clone();
                let target = host.clone();
                let handle = tokio::spawn(async move { prober.probe(&target).await });
                (host, handle)
            })
            .collect()
    }
}

impl std::fmt::Debug for NodeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeMonitor")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("live_source", &self.live_source.is_some())
            .field("cycles", &self.cycles.load(Ordering::SeqCst))
            .finish()
    }
}

/// ライブノードのプローブ結果を統合する
///
/// ライブノードは毎サイクル作り直すため、直前の可用性は前回スナップショットで判断する。
/// 前回スナップショットにないノードは利用不可だったものとして扱う。
fn merge_live(
    previous: &Snapshot,
    combined: &mut BTreeMap<Hostname, NodeRecord>,
    results: Vec<(Hostname, ProbeOutcome)>,
) -> Vec<(Hostname, Transition)> {
    let mut transitions = Vec::new();
    for (host, outcome) in results {
        let prior = previous
            .get(&host)
            .cloned()
            .unwrap_or_else(NodeRecord::placeholder);
        let (record, transition) = apply_outcome(prior, outcome);
        if transition != Transition::Unchanged {
            transitions.push((host.clone(), transition));
        }
        combined.insert(host, record);
    }
    transitions
}

/// 全プローブタスクの完了を待つ
///
/// 異常終了したタスクはそのノードの`Unreachable`として扱う。
async fn join_probes(tasks: ProbeTasks) -> Vec<(Hostname, ProbeOutcome)> {
    let mut results = Vec::with_capacity(tasks.len());
    for (host, handle) in tasks {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(node = %host, error = %e, "Probe task join error");
                ProbeOutcome::Unreachable(ProbeError::TaskAborted(e.to_string()))
            }
        };
        results.push((host, outcome));
    }
    results
}
