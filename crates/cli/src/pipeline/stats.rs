//! Load-run statistics.

use std::time::Duration;

use observability::DeliverySummary;
use router::RouterReport;

/// Statistics from a load run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Messages handed to the router
    pub generated: u64,

    /// Wall time from first message to router stop
    pub duration: Duration,

    /// Run stopped early by a signal or the timeout
    pub interrupted: bool,

    /// Router totals at stop
    pub router: RouterReport,

    /// Per-call delivery aggregation
    pub deliveries: DeliverySummary,
}

impl RunStats {
    /// Completed vendor calls per second
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.router.metrics.completed() as f64 / secs
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let m = &self.router.metrics;

        println!("\n=== Run Summary ===");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Generated: {}", self.generated);
        if self.interrupted {
            println!("Interrupted: yes");
        }
        println!("Throughput: {:.2} calls/s", self.throughput());

        println!("\n=== Routing ===");
        println!("Received: {}", m.received);
        println!("Dispatched on arrival: {}", m.dispatched);
        println!("Queued: {}", m.queued);
        println!("Dispatched from queue: {}", m.retry_dispatched);
        println!("Rejected: {}", m.rejected);
        println!("Abandoned: {}", m.abandoned);
        if !self.router.drained {
            println!("Retry queue did not drain within the grace period");
        }

        println!();
        print!("{}", self.deliveries);

        println!("\n=== Vendor Utilization ===");
        for vendor in &self.router.vendors {
            println!(
                "  {}: {}/{} in use",
                vendor.name, vendor.utilized, vendor.budget
            );
        }

        println!();
    }
}
