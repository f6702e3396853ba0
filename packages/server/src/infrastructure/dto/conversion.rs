//! Conversion logic between domain entities and DTOs.

use crate::domain::RoomSummary;
use crate::infrastructure::dto::http::RoomSummaryDto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<RoomSummary> for RoomSummaryDto {
    fn from(model: RoomSummary) -> Self {
        Self {
            room_id: model.room_id.into_string(),
            participants: model.participants,
        }
    }
}
