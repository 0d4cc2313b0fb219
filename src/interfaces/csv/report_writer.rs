use crate::application::metrics::{DashboardMetrics, RevenueReport};
use crate::domain::shipment::Shipment;
use crate::error::Result;
use std::io::Write;

/// Writes shipment listings and metric reports as CSV.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// One row per shipment:
    /// `id,sender,recipient,destination,weight,price,status`.
    pub fn write_shipments(&mut self, shipments: &[Shipment]) -> Result<()> {
        self.writer.write_record([
            "id",
            "sender",
            "recipient",
            "destination",
            "weight",
            "price",
            "status",
        ])?;
        for shipment in shipments {
            self.writer.write_record([
                shipment.id.to_string(),
                shipment.sender_id.to_string(),
                shipment.recipient_id.to_string(),
                shipment.destination.to_string(),
                shipment.weight.to_string(),
                shipment.price.to_string(),
                shipment.status.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_dashboard(&mut self, metrics: &DashboardMetrics) -> Result<()> {
        self.writer
            .write_record(["total", "in_transit", "delivered", "total_revenue"])?;
        self.writer.write_record([
            metrics.total.to_string(),
            metrics.in_transit.to_string(),
            metrics.delivered.to_string(),
            metrics.total_revenue.to_string(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_revenue(&mut self, report: &RevenueReport) -> Result<()> {
        self.writer
            .write_record(["total_revenue", "delivered_count"])?;
        self.writer.write_record([
            report.total_revenue.to_string(),
            report.delivered_count.to_string(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shipment::{Destination, ShipmentStatus, Weight};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn shipment() -> Shipment {
        let now = Utc::now();
        Shipment {
            id: 1,
            sender_id: 1,
            recipient_id: 2,
            registered_by: 1,
            destination: Destination::Office(10),
            weight: Weight::new(dec!(2.75)).unwrap(),
            price: dec!(10.50),
            status: ShipmentStatus::Registered,
            registered_at: now,
            delivered_at: None,
            updated_at: now,
        }
    }

    #[test]
    fn test_write_shipments() {
        let mut out = Vec::new();
        ReportWriter::new(&mut out)
            .write_shipments(&[shipment()])
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("id,sender,recipient,destination,weight,price,status\n"));
        assert!(text.contains("1,1,2,office:10,2.75,10.50,registered"));
    }

    #[test]
    fn test_write_dashboard() {
        let mut out = Vec::new();
        ReportWriter::new(&mut out)
            .write_dashboard(&DashboardMetrics {
                total: 5,
                in_transit: 1,
                delivered: 2,
                total_revenue: dec!(70.00),
            })
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("5,1,2,70.00"));
    }

    #[test]
    fn test_write_revenue_zeroes() {
        let mut out = Vec::new();
        ReportWriter::new(&mut out)
            .write_revenue(&RevenueReport {
                total_revenue: Decimal::ZERO,
                delivered_count: 0,
            })
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("total_revenue,delivered_count"));
        assert!(text.contains("0,0"));
    }
}
