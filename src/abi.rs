use alloy::sol;

// Contract bindings for the MiniDex deployment. The pool contract doubles
// as the ERC-20 LP token, so LP balances and total supply are read through
// the IERC20 binding at the pool address.
sol! {
    /// Minimal ERC-20 interface: balance/metadata reads plus the approve and
    /// transfer entry points the flows submit.
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string memory);
        function totalSupply() external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }

    /// Constant-product pool holding two tokens and minting its own LP token.
    #[sol(rpc)]
    interface ILiquidityPool {
        function getReserves() external view returns (uint256 reserveA, uint256 reserveB);
        function swap(uint256 amountAIn, uint256 amountBIn, address to) external;
        function addLiquidity(uint256 amountA, uint256 amountB) external returns (uint256 shares);
        function removeLiquidity(uint256 shares) external returns (uint256 amountA, uint256 amountB);
    }
}
