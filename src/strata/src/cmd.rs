pub mod kinds;
pub mod normalize;
pub mod tree;

/// Represents a command in the Strata application.
pub trait Command {
    /// Consumes a command object and executes the handler actions
    /// associated with it.
    ///
    /// On failure, an error will be reported.
    fn handle(self) -> eyre::Result<()>;
}
