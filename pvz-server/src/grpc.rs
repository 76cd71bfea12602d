//! gRPC listing endpoint
//!
//! `pvz.v1.PVZService/GetPVZList` plus the standard gRPC health service,
//! served on their own port next to the REST API.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::error::AppError;
use shared::models::PickupPoint;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

use crate::service::PvzService;

pub mod proto {
    tonic::include_proto!("pvz.v1");
}

use proto::pvz_service_server::{PvzService as PvzRpc, PvzServiceServer};
use proto::{GetPvzListRequest, GetPvzListResponse, Pvz};

pub struct GrpcHandler {
    service: Arc<PvzService>,
}

impl GrpcHandler {
    pub fn new(service: Arc<PvzService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl PvzRpc for GrpcHandler {
    #[tracing::instrument(skip_all)]
    async fn get_pvz_list(
        &self,
        _request: Request<GetPvzListRequest>,
    ) -> Result<Response<GetPvzListResponse>, Status> {
        let points = self
            .service
            .list_all_pickup_points()
            .await
            .map_err(|e| Status::internal(AppError::from(e).message))?;

        Ok(Response::new(GetPvzListResponse {
            pvzs: points.into_iter().map(to_proto).collect(),
        }))
    }
}

fn to_proto(point: PickupPoint) -> Pvz {
    Pvz {
        id: point.id.to_string(),
        registration_date: Some(timestamp(point.registration_date)),
        city: point.city,
    }
}

fn timestamp(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        // Leap-second nanos exceed the protobuf range
        nanos: at.timestamp_subsec_nanos().min(999_999_999) as i32,
    }
}

/// Serve the listing and health services until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<PvzService>,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()> + Send,
{
    let (mut reporter, health) = tonic_health::server::health_reporter();
    reporter
        .set_serving::<PvzServiceServer<GrpcHandler>>()
        .await;

    Server::builder()
        .add_service(health)
        .add_service(PvzServiceServer::new(GrpcHandler::new(service)))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}
