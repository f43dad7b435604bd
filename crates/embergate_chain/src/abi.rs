//! # Contract Definitions
//!
//! Solidity interfaces of the two external collaborators, as the client
//! depends on them. Deployed bytecode is not part of this repository.

// The sol! macro generates code that we can't document, so allow missing_docs
#![allow(missing_docs)]

use alloy_sol_types::sol;

// The escrow market holds listed relics in fixed-index slots until they are
// bought or removed by the seller.
sol! {
    /// The escrow marketplace contract.
    ///
    /// A slot read that reverts marks the end of the valid slot range; the
    /// client treats it as end-of-data, never as a transient error.
    #[derive(Debug)]
    interface IEscrowMarket {
        /// Places tokens in escrow at the next free slot.
        function createEscrow(
            address tokenContract,
            uint256 tokenID,
            uint256 amount,
            uint256 priceInWei
        ) public;

        /// Buys the listing in slot `slotIndex`; payment rides as msg.value.
        function buyWithPayment(uint256 slotIndex) external payable;

        /// Reads the slot tuple. Reverts past the backing storage.
        function getEscrowSlot(uint256 slotIndex) public view returns (
            address seller,
            address tokenContract,
            uint256 tokenID,
            uint256 amount,
            uint256 price
        );

        /// Removes a listing. Only the seller may remove; the contract is
        /// the authority, the client does not pre-check.
        function removeEscrow(uint256 slotIndex) external;
    }
}

sol! {
    /// The relic token contract (multi-token standard subset the client uses).
    #[derive(Debug)]
    interface IRelicToken {
        /// Grants or revokes an operator over all of the caller's tokens.
        function setApprovalForAll(address operator, bool approved) external;

        /// Queries an operator grant.
        function isApprovedForAll(address owner, address operator) external view returns (bool);

        /// Metadata URI template containing the literal `{id}` placeholder.
        function uri(uint256 tokenID) external view returns (string memory);
    }
}
