use super::wire::{
    ErrorBody, FilesBody, LogsBody, MessageBody, MonitoringStatusBody, StartBody, StatusBody,
    UploadBody,
};
use super::{HealthInfo, MonitoringStarted, RemoteGateway, UploadReceipt};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{LogEntry, MonitoringState, ProtectedFile, SystemStatus};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// 基于 HTTP/JSON 的 File Guardian API 客户端
pub struct HttpGateway {
    client: Client,
    base_url: String,
    log_limit: u32,
    name: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration, log_limit: u32) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Unexpected(format!("创建 HTTP 客户端失败: {}", e)))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let name = format!("http:{}", base_url);

        Ok(Self {
            client,
            base_url,
            log_limit,
            name,
        })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(
            &config.server_url,
            config.request_timeout(),
            config.effective_log_limit(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 发送请求并返回成功响应的 JSON
    async fn send(&self, request: RequestBuilder) -> ClientResult<serde_json::Value> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        // 服务器限流，等下一轮即可
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::Transient("请求过于频繁".to_string()));
        }

        let text = response.text().await.map_err(transport_error)?;
        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) if status.is_server_error() => {
                return Err(ClientError::Transient(format!("服务器错误: HTTP {}", status)));
            }
            Err(e) => {
                return Err(ClientError::Unexpected(format!(
                    "响应不是有效 JSON (HTTP {}): {}",
                    status, e
                )));
            }
        };

        let error_body: ErrorBody = serde_json::from_value(value.clone()).unwrap_or_default();

        if !status.is_success() || error_body.success == Some(false) {
            let message = error_body
                .error
                .unwrap_or_else(|| format!("请求失败: HTTP {}", status));
            return Err(ClientError::rejected(message, error_body.error_code));
        }

        Ok(value)
    }

    async fn send_as<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let value = self.send(request).await?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::Unexpected(format!("响应格式不符: {}", e)))
    }
}

fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_builder() || e.is_decode() {
        ClientError::Unexpected(e.to_string())
    } else {
        ClientError::Transient(e.to_string())
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn check_health(&self) -> ClientResult<HealthInfo> {
        self.send_as(self.client.get(self.url("/api/health"))).await
    }

    async fn fetch_status(&self) -> ClientResult<SystemStatus> {
        let body: StatusBody = self.send_as(self.client.get(self.url("/api/status"))).await?;
        Ok(body.into())
    }

    async fn fetch_files(&self) -> ClientResult<Vec<ProtectedFile>> {
        let body: FilesBody = self.send_as(self.client.get(self.url("/api/files"))).await?;
        Ok(body.files.into_iter().map(Into::into).collect())
    }

    async fn upload_file(&self, path: &str) -> ClientResult<UploadReceipt> {
        debug!("上传文件: {}", path);
        let body: UploadBody = self
            .send_as(
                self.client
                    .post(self.url("/api/files/upload"))
                    .json(&serde_json::json!({ "filepath": path })),
            )
            .await?;

        Ok(UploadReceipt {
            message: body.message.unwrap_or_default(),
            doc_id: body.doc_id,
            auto_protected: body.auto_protected,
        })
    }

    async fn delete_file(&self, id: &str) -> ClientResult<String> {
        let url = self.url(&format!("/api/files/{}", urlencoding::encode(id)));
        let body: MessageBody = self.send_as(self.client.delete(url)).await?;
        Ok(body.message.unwrap_or_default())
    }

    async fn start_monitoring(&self) -> ClientResult<MonitoringStarted> {
        let body: StartBody = self
            .send_as(self.client.post(self.url("/api/monitoring/start")))
            .await?;
        Ok(MonitoringStarted {
            message: body.message.unwrap_or_default(),
            protected_count: body.protected_count,
        })
    }

    async fn stop_monitoring(&self) -> ClientResult<String> {
        let body: MessageBody = self
            .send_as(self.client.post(self.url("/api/monitoring/stop")))
            .await?;
        Ok(body.message.unwrap_or_default())
    }

    async fn fetch_monitoring_status(&self) -> ClientResult<MonitoringState> {
        let body: MonitoringStatusBody = self
            .send_as(self.client.get(self.url("/api/monitoring/status")))
            .await?;
        Ok(body.into())
    }

    async fn fetch_logs(&self) -> ClientResult<Vec<LogEntry>> {
        let body: LogsBody = self
            .send_as(
                self.client
                    .get(self.url("/api/logs"))
                    .query(&[("limit", self.log_limit)]),
            )
            .await?;

        // 服务器最新在前，这里转为最新在后
        let mut logs: Vec<LogEntry> = body.logs.into_iter().map(Into::into).collect();
        logs.reverse();
        Ok(logs)
    }

    async fn clear_logs(&self) -> ClientResult<String> {
        let body: MessageBody = self.send_as(self.client.delete(self.url("/api/logs"))).await?;
        Ok(body.message.unwrap_or_default())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
